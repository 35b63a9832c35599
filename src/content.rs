//! Content-stream operators.
//!
//! Each method appends one ASCII fragment to the stream payload, encoding
//! one PDF graphics, text or inline-image operator. Numeric operands go
//! through the same number formatting as every other serialized value.

use crate::filters;
use crate::writer::{format_real, Writer};
use crate::{Object, Stream};

fn reals(values: &[f64]) -> String {
    values
        .iter()
        .map(|&value| format_real(value))
        .collect::<Vec<String>>()
        .join(" ")
}

impl Stream {
    fn op<T: Into<Vec<u8>>>(&mut self, fragment: T) {
        self.content.push(Object::Bytes(fragment.into()));
    }

    /// Begin a text object.
    pub fn begin_text(&mut self) {
        self.op("BT");
    }

    /// End a text object.
    pub fn end_text(&mut self) {
        self.op("ET");
    }

    /// Begin a marked-content sequence, with an optional property list.
    pub fn begin_marked_content(&mut self, tag: &str, property_list: Option<Object>) {
        match property_list {
            None => self.op(format!("/{} BMC", tag)),
            Some(properties) => {
                let mut fragment = format!("/{} ", tag).into_bytes();
                fragment.extend_from_slice(&Writer::object_bytes(&properties));
                fragment.extend_from_slice(b" BDC");
                self.op(fragment);
            }
        }
    }

    /// End a marked-content sequence.
    pub fn end_marked_content(&mut self) {
        self.op("EMC");
    }

    /// Begin a new subpath at (x, y).
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.op(format!("{} m", reals(&[x, y])));
    }

    /// Add a line from the current point to (x, y).
    pub fn line_to(&mut self, x: f64, y: f64) {
        self.op(format!("{} l", reals(&[x, y])));
    }

    /// Add a cubic Bézier curve with control points (x1, y1) and (x2, y2).
    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.op(format!("{} c", reals(&[x1, y1, x2, y2, x3, y3])));
    }

    /// Add a cubic Bézier curve using the current point as first control point.
    pub fn curve_start_to(&mut self, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.op(format!("{} v", reals(&[x2, y2, x3, y3])));
    }

    /// Add a cubic Bézier curve using the end point as second control point.
    pub fn curve_end_to(&mut self, x1: f64, y1: f64, x3: f64, y3: f64) {
        self.op(format!("{} y", reals(&[x1, y1, x3, y3])));
    }

    /// Add a rectangle to the current path as a complete subpath.
    pub fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.op(format!("{} re", reals(&[x, y, width, height])));
    }

    /// Close the current subpath.
    pub fn close(&mut self) {
        self.op("h");
    }

    /// Stroke the path.
    pub fn stroke(&mut self) {
        self.op("S");
    }

    /// Close and stroke the path.
    pub fn stroke_and_close(&mut self) {
        self.op("s");
    }

    /// Fill the path, using the even-odd rule instead of nonzero winding
    /// when requested.
    pub fn fill(&mut self, even_odd: bool) {
        self.op(if even_odd { "f*" } else { "f" });
    }

    /// Fill and stroke the path.
    pub fn fill_and_stroke(&mut self, even_odd: bool) {
        self.op(if even_odd { "B*" } else { "B" });
    }

    /// Fill, stroke and close the path.
    pub fn fill_stroke_and_close(&mut self, even_odd: bool) {
        self.op(if even_odd { "b*" } else { "b" });
    }

    /// Intersect the clipping path with the current path.
    pub fn clip(&mut self, even_odd: bool) {
        self.op(if even_odd { "W*" } else { "W" });
    }

    /// End the path without filling or stroking.
    pub fn end_path(&mut self) {
        self.op("n");
    }

    /// Save the graphics state.
    pub fn push_state(&mut self) {
        self.op("q");
    }

    /// Restore the graphics state.
    pub fn pop_state(&mut self) {
        self.op("Q");
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.op(format!("{} w", format_real(width)));
    }

    pub fn set_line_cap(&mut self, line_cap: i64) {
        self.op(format!("{} J", line_cap));
    }

    pub fn set_line_join(&mut self, line_join: i64) {
        self.op(format!("{} j", line_join));
    }

    pub fn set_miter_limit(&mut self, miter_limit: f64) {
        self.op(format!("{} M", format_real(miter_limit)));
    }

    /// Set the dash pattern, e.g. `&[2.0, 1.0]` with phase 0 for
    /// two units on, one unit off.
    pub fn set_dash(&mut self, dash_array: &[f64], dash_phase: f64) {
        let array = Object::Array(dash_array.iter().map(|&value| Object::Real(value)).collect());
        let mut fragment = Writer::object_bytes(&array);
        fragment.extend_from_slice(format!(" {} d", format_real(dash_phase)).as_bytes());
        self.op(fragment);
    }

    /// Concatenate a matrix to the current transformation matrix.
    pub fn set_matrix(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.op(format!("{} cm", reals(&[a, b, c, d, e, f])));
    }

    /// Set the text and text-line matrices.
    pub fn set_text_matrix(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.op(format!("{} Tm", reals(&[a, b, c, d, e, f])));
    }

    /// Move to the next line, (x, y) away from the previous line start.
    pub fn move_text_to(&mut self, x: f64, y: f64) {
        self.op(format!("{} Td", reals(&[x, y])));
    }

    /// Select the font, by resource name, and the font size.
    pub fn set_font_size(&mut self, font: &str, size: f64) {
        self.op(format!("/{} {} Tf", font, format_real(size)));
    }

    pub fn set_text_rendering(&mut self, mode: i64) {
        self.op(format!("{} Tr", mode));
    }

    pub fn set_text_rise(&mut self, height: f64) {
        self.op(format!("{} Ts", format_real(height)));
    }

    /// Show a single text string.
    pub fn show_text_string(&mut self, text: &str) {
        let mut fragment = Writer::object_bytes(&Object::text(text));
        fragment.extend_from_slice(b" Tj");
        self.op(fragment);
    }

    /// Show text with individual glyph positioning; `text` is emitted
    /// verbatim inside the `TJ` array.
    pub fn show_text(&mut self, text: &[u8]) {
        let mut fragment = Vec::with_capacity(text.len() + 5);
        fragment.push(b'[');
        fragment.extend_from_slice(text);
        fragment.extend_from_slice(b"] TJ");
        self.op(fragment);
    }

    /// Set the RGB color for stroking or nonstroking operations.
    pub fn set_color_rgb(&mut self, r: f64, g: f64, b: f64, stroke: bool) {
        self.op(format!("{} {}", reals(&[r, g, b]), if stroke { "RG" } else { "rg" }));
    }

    /// Set the color space for stroking or nonstroking operations.
    pub fn set_color_space(&mut self, space: &str, stroke: bool) {
        self.op(format!("/{} {}", space, if stroke { "CS" } else { "cs" }));
    }

    /// Set a special color (pattern, separation, ...) from operands and an
    /// optional pattern name.
    pub fn set_color_special(&mut self, name: Option<&str>, stroke: bool, operands: &[Object]) {
        let mut parts: Vec<Vec<u8>> = operands.iter().map(Writer::object_bytes).collect();
        if let Some(name) = name {
            parts.push(format!("/{}", name).into_bytes());
        }
        parts.push(if stroke { b"SCN".to_vec() } else { b"scn".to_vec() });
        self.op(parts.join(&b' '));
    }

    /// Apply the named graphics-state parameter dictionary.
    pub fn set_state(&mut self, state_name: &str) {
        self.op(format!("/{} gs", state_name));
    }

    /// Paint the named shading.
    pub fn paint_shading(&mut self, name: &str) {
        self.op(format!("/{} sh", name));
    }

    /// Draw the named external object.
    pub fn draw_xobject(&mut self, name: &str) {
        self.op(format!("/{} Do", name));
    }

    /// Add an inline image. The sample data is ASCII85-encoded, behind an
    /// extra deflate pass when the stream is compressed, and `color_space`
    /// names the `/Device...` family member ("RGB", "Gray", "CMYK").
    pub fn inline_image(
        &mut self, width: i64, height: i64, color_space: &str, bits_per_component: i64,
        data: &[u8],
    ) {
        let data = if self.compress {
            filters::deflate(data)
        } else {
            data.to_vec()
        };
        let encoded = filters::ascii85_encode(&data);
        let filter = if self.compress { "[/A85 /Fl]" } else { "/A85" };

        let mut fragment = format!(
            "BI /W {} /H {} /BPC {} /CS /Device{} /F {} /L {} ID ",
            width,
            height,
            bits_per_component,
            color_space,
            filter,
            encoded.len()
        )
        .into_bytes();
        fragment.extend_from_slice(&encoded);
        fragment.extend_from_slice(b" EI");
        self.op(fragment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary;

    fn fragments(stream: &Stream) -> Vec<String> {
        stream
            .content
            .iter()
            .map(|fragment| String::from_utf8_lossy(&Writer::object_bytes(fragment)).into_owned())
            .collect()
    }

    fn empty_stream() -> Stream {
        Stream::new(dictionary! {}, Vec::new())
    }

    #[test]
    fn path_construction_and_painting() {
        let mut draw = empty_stream();
        draw.rectangle(2.0, 2.0, 5.0, 6.0);
        draw.fill(false);
        draw.move_to(2.0, 2.0);
        draw.line_to(2.0, 5.0);
        draw.curve_to(2.0, 5.0, 3.0, 5.0, 5.0, 5.0);
        draw.close();
        draw.stroke();
        assert_eq!(
            fragments(&draw),
            ["2 2 5 6 re", "f", "2 2 m", "2 5 l", "2 5 3 5 5 5 c", "h", "S"]
        );
    }

    #[test]
    fn even_odd_variants() {
        let mut draw = empty_stream();
        draw.fill(true);
        draw.fill_and_stroke(true);
        draw.fill_stroke_and_close(false);
        draw.clip(true);
        draw.end_path();
        assert_eq!(fragments(&draw), ["f*", "B*", "b", "W*", "n"]);
    }

    #[test]
    fn graphics_state_operators() {
        let mut draw = empty_stream();
        draw.push_state();
        draw.set_line_width(2.0);
        draw.set_line_cap(1);
        draw.set_line_join(0);
        draw.set_miter_limit(10.0);
        draw.set_dash(&[2.0, 1.0], 0.0);
        draw.set_matrix(100.0, 0.0, 0.0, 100.0, 100.0, 100.0);
        draw.set_state("GS1");
        draw.pop_state();
        assert_eq!(
            fragments(&draw),
            [
                "q",
                "2 w",
                "1 J",
                "0 j",
                "10 M",
                "[2 1] 0 d",
                "100 0 0 100 100 100 cm",
                "/GS1 gs",
                "Q"
            ]
        );
    }

    #[test]
    fn text_operators() {
        let mut text = empty_stream();
        text.begin_text();
        text.set_font_size("F1", 12.0);
        text.set_text_rendering(2);
        text.set_text_rise(0.5);
        text.set_text_matrix(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        text.move_text_to(100.0, 600.0);
        text.show_text_string("Hello");
        text.show_text(b"(He) 10 (llo)");
        text.end_text();
        assert_eq!(
            fragments(&text),
            [
                "BT",
                "/F1 12 Tf",
                "2 Tr",
                "0.5 Ts",
                "1 0 0 1 0 0 Tm",
                "100 600 Td",
                "(Hello) Tj",
                "[(He) 10 (llo)] TJ",
                "ET"
            ]
        );
    }

    #[test]
    fn unicode_text_string_uses_hex_form() {
        let mut text = empty_stream();
        text.show_text_string("héllo");
        assert!(fragments(&text)[0].starts_with("<feff"));
        assert!(fragments(&text)[0].ends_with("> Tj"));
    }

    #[test]
    fn color_operators() {
        let mut draw = empty_stream();
        draw.set_color_rgb(0.0, 0.0, 1.0, true);
        draw.set_color_rgb(1.0, 0.0, 0.0, false);
        draw.set_color_space("Pattern", false);
        draw.set_color_space("DeviceGray", true);
        draw.set_color_special(Some("P1"), false, &[1.into()]);
        draw.set_color_special(None, true, &[0.5.into(), 0.25.into()]);
        assert_eq!(
            fragments(&draw),
            [
                "0 0 1 RG",
                "1 0 0 rg",
                "/Pattern cs",
                "/DeviceGray CS",
                "1 /P1 scn",
                "0.5 0.25 SCN"
            ]
        );
    }

    #[test]
    fn marked_content_operators() {
        let mut stream = empty_stream();
        stream.begin_marked_content("Artifact", None);
        stream.end_marked_content();
        stream.begin_marked_content("P", Some(dictionary! { "MCID" => 0 }.into()));
        assert_eq!(
            fragments(&stream),
            ["/Artifact BMC", "EMC", "/P << /MCID 0 >> BDC"]
        );
    }

    #[test]
    fn shading_and_xobjects() {
        let mut draw = empty_stream();
        draw.paint_shading("Sh0");
        draw.draw_xobject("Im1");
        assert_eq!(fragments(&draw), ["/Sh0 sh", "/Im1 Do"]);
    }

    #[test]
    fn inline_image_plain() {
        let mut draw = empty_stream();
        draw.inline_image(2, 1, "Gray", 8, &[0x00, 0x80, 0xff, 0x00, 0x80, 0xff]);
        let fragment = &fragments(&draw)[0];
        assert!(fragment.starts_with("BI /W 2 /H 1 /BPC 8 /CS /DeviceGray /F /A85 /L "));
        assert!(fragment.contains(" ID "));
        assert!(fragment.contains("~>"));
        assert!(fragment.ends_with(" EI"));

        let declared: usize = fragment
            .split("/L ")
            .nth(1)
            .unwrap()
            .split_whitespace()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        let encoded = fragment
            .split(" ID ")
            .nth(1)
            .unwrap()
            .strip_suffix(" EI")
            .unwrap();
        assert_eq!(declared, encoded.len());
        assert!(encoded.ends_with("~>"));
    }

    #[test]
    fn inline_image_compressed_uses_both_filters() {
        let mut draw = empty_stream();
        draw.compress = true;
        draw.inline_image(2, 1, "RGB", 8, &[0xff; 6]);
        let fragment = &fragments(&draw)[0];
        assert!(fragment.contains("/F [/A85 /Fl] "));
    }
}
