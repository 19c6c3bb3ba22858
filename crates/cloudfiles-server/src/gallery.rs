//! HTML rendering of the image gallery.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cloudfiles::File;

/// MIME type for an image extension.
fn image_mime(extension: &str) -> String {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "svg" => "image/svg+xml".to_string(),
        other => format!("image/{}", other),
    }
}

/// Escape text for use inside HTML attributes and elements.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Render `images` as inline data URLs.
pub fn render(images: &[File]) -> String {
    let mut html = String::from(
        "<html><body><h1>Image Gallery</h1><div style='display: flex; flex-wrap: wrap;'>",
    );

    for file in images {
        html.push_str(&format!(
            "<div style='margin: 10px;'><img src='data:{};base64,{}' alt='{}' style='width: 200px; height: auto;'></div>",
            image_mime(&file.metadata.extension),
            STANDARD.encode(&file.data),
            escape_html(&file.metadata.name),
        ));
    }

    html.push_str("</div></body></html>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudfiles::FileMetadata;

    #[test]
    fn test_render_escapes_names() {
        let image = File::new(FileMetadata::new("<script>'x'", "PNG"), &b"img"[..]);
        let html = render(&[image]);

        assert!(html.contains("data:image/png;base64,aW1n"));
        assert!(html.contains("alt='&lt;script&gt;&#39;x&#39;'"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_empty_gallery() {
        let html = render(&[]);
        assert!(html.starts_with("<html><body><h1>Image Gallery</h1>"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(image_mime("jpg"), "image/jpeg");
        assert_eq!(image_mime("svg"), "image/svg+xml");
        assert_eq!(image_mime("gif"), "image/gif");
    }
}
