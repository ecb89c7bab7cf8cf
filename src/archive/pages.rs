use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

/// Token in report pages standing for the session's images directory.
pub const IMAGE_PLACEHOLDER: &str = "REPLACEME";

/// Payload shown when a path has no usable report.
pub fn no_report_html(path: &str) -> String {
    format!("<p>No report for path:{} </p>", escape_html(path))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

pub fn substitute_images_dir(page: &str, images_dir: &Path) -> String {
    page.replace(IMAGE_PLACEHOLDER, &images_dir.to_string_lossy())
}

/// Decompress a gzip file from the workspace into text, reading every
/// concatenated gzip member.
pub fn read_gz_text(path: &Path) -> io::Result<String> {
    let mut decoder = MultiGzDecoder::new(BufReader::new(File::open(path)?));
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Wrap each hex-dump line in its own table row (`id="hexlineN"`, N from 1)
/// so callers can attach metadata per line. At most `line_limit` lines.
pub fn render_hexdump<R: BufRead>(mut reader: R, line_limit: usize) -> io::Result<String> {
    let mut out = String::from("<table class=\"table\">\n");
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    while line_no < line_limit {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        out.push_str("<tr><td class=\"codeline\">");
        out.push_str(&escape_html(line));
        out.push_str(&format!(
            "</td> <td class=\"codemeta\" id=\"hexline{}\"></td></tr>",
            line_no
        ));
    }

    out.push_str("</table>");
    Ok(out)
}

/// Render a gzip-compressed hex dump from the workspace.
pub fn render_hexdump_file(path: &Path, line_limit: usize) -> io::Result<String> {
    let decoder = MultiGzDecoder::new(BufReader::new(File::open(path)?));
    render_hexdump(BufReader::new(decoder), line_limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_line_gets_its_own_row() {
        let dump = "00000000  7f 45 4c 46  |.ELF|\n00000010  01 02  |..|\n";
        let html = render_hexdump(dump.as_bytes(), 1000).unwrap();
        assert!(html.starts_with("<table class=\"table\">\n"));
        assert!(html.ends_with("</table>"));
        assert!(html.contains("id=\"hexline1\""));
        assert!(html.contains("id=\"hexline2\""));
        assert!(!html.contains("id=\"hexline3\""));
        assert!(html.contains("<td class=\"codeline\">00000000  7f 45 4c 46  |.ELF|</td>"));
    }

    #[test]
    fn output_is_truncated_at_the_line_limit() {
        let dump: String = (0..50).map(|i| format!("line {}\n", i)).collect();
        let html = render_hexdump(dump.as_bytes(), 10).unwrap();
        assert_eq!(html.matches("<tr>").count(), 10);
        assert!(html.contains("hexline10"));
        assert!(!html.contains("hexline11"));
    }

    #[test]
    fn markup_in_dump_is_escaped() {
        let html = render_hexdump("3c 3e  |<>|".as_bytes(), 5).unwrap();
        assert!(html.contains("|&lt;&gt;|"));
    }

    #[test]
    fn placeholder_is_replaced_everywhere() {
        let page = "<img src=\"REPLACEME/a.png\"><img src=\"REPLACEME/b.png\">";
        let out = substitute_images_dir(page, Path::new("/tmp/ws/images"));
        assert_eq!(out, "<img src=\"/tmp/ws/images/a.png\"><img src=\"/tmp/ws/images/b.png\">");
    }

    #[test]
    fn concatenated_gzip_members_are_read_in_full() {
        use std::io::Write;

        let gz = |text: &[u8]| {
            let mut encoder =
                flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(text).unwrap();
            encoder.finish().unwrap()
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.gz");
        let mut bytes = gz(b"line one\n");
        bytes.extend(gz(b"line two\n"));
        std::fs::write(&path, bytes).unwrap();

        assert_eq!(read_gz_text(&path).unwrap(), "line one\nline two\n");
        let html = render_hexdump_file(&path, 10).unwrap();
        assert!(html.contains("line two"));
        assert!(html.contains("id=\"hexline2\""));
    }

    #[test]
    fn sentinel_names_the_path() {
        assert_eq!(no_report_html("a/b"), "<p>No report for path:a/b </p>");
    }
}
