use std::path::Path;

const FALLBACK: &str = r#"<!DOCTYPE html><html><head><meta charset="UTF-8"><title>Riesgo de anemia</title></head><body><p>Static files not found. Set STATIC_DIR or place index.html and login.html in ./static/</p></body></html>"#;

/// Contents of `name` under `static_dir`, or a placeholder page.
pub fn render(static_dir: &Path, name: &str) -> String {
    std::fs::read_to_string(static_dir.join(name)).unwrap_or_else(|_| FALLBACK.to_string())
}
