use std::fmt::Write as _;

use rust_embed::RustEmbed;

use crate::generation::examples::ExamplePoster;
use crate::generation::generation_service::{GenerationRequest, DEFAULT_DISTANCE, DEFAULT_THEME};
use crate::rendering::types::GeneratedPoster;
use crate::storage::PosterFile;

/// Files under `assets/`, compiled into the binary.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/assets/"]
pub struct Assets;

const INDEX_TEMPLATE: &str = "index.html";

/// Result of the inline generation form, if it was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Empty,
    Generated(GeneratedPoster),
    Failed(String),
}

/// Everything shown on the landing page.
#[derive(Debug, Clone)]
pub struct IndexPage {
    pub themes: Vec<String>,
    pub examples: Vec<ExamplePoster>,
    pub posters: Vec<PosterFile>,
    pub trash: Vec<PosterFile>,
    pub values: GenerationRequest,
    pub outcome: Outcome,
}

impl IndexPage {
    pub fn default_values() -> GenerationRequest {
        GenerationRequest {
            city: String::new(),
            country: String::new(),
            theme: DEFAULT_THEME.to_string(),
            distance: DEFAULT_DISTANCE,
        }
    }

    pub fn render(&self) -> String {
        let template = Assets::get(INDEX_TEMPLATE)
            .map(|file| String::from_utf8_lossy(&file.data).into_owned())
            .unwrap_or_default();

        template
            .replace("{{city}}", &escape(&self.values.city))
            .replace("{{country}}", &escape(&self.values.country))
            .replace("{{distance}}", &self.values.distance.to_string())
            .replace("{{theme_options}}", &self.theme_options())
            .replace("{{outcome}}", &self.outcome_html())
            .replace("{{examples}}", &self.examples_html())
            .replace("{{posters}}", &poster_cards(&self.posters, &["delete"]))
            .replace("{{trash}}", &poster_cards(&self.trash, &["restore", "purge"]))
    }

    fn theme_options(&self) -> String {
        let mut html = String::new();
        for theme in &self.themes {
            let selected = if *theme == self.values.theme { " selected" } else { "" };
            let theme = escape(theme);
            let _ = writeln!(html, r#"<option value="{theme}"{selected}>{theme}</option>"#);
        }
        html
    }

    fn outcome_html(&self) -> String {
        match &self.outcome {
            Outcome::Empty => String::new(),
            Outcome::Generated(poster) => format!(
                r#"<p class="result">Poster ready: <a href="{path}">{name}</a></p>"#,
                path = escape(&poster.path),
                name = escape(&poster.filename)
            ),
            Outcome::Failed(message) => {
                format!(r#"<p class="error">{}</p>"#, escape(message))
            }
        }
    }

    fn examples_html(&self) -> String {
        let mut html = String::new();
        for example in &self.examples {
            let _ = writeln!(
                html,
                r#"<figure class="card"><img src="{path}" alt="{theme}" loading="lazy"><figcaption>{theme}</figcaption></figure>"#,
                path = escape(&example.path),
                theme = escape(&example.theme)
            );
        }
        html
    }
}

fn poster_cards(files: &[PosterFile], actions: &[&str]) -> String {
    if files.is_empty() {
        return r#"<p class="empty">Nothing here yet.</p>"#.to_string();
    }
    let mut html = String::new();
    for file in files {
        let name = escape(&file.filename);
        let title = file
            .meta
            .get("Title")
            .map(|t| escape(t))
            .unwrap_or_else(|| name.clone());
        let mut details = String::new();
        for (key, value) in &file.meta {
            let _ = write!(details, "<dt>{}</dt><dd>{}</dd>", escape(key), escape(value));
        }
        let mut buttons = String::new();
        for action in actions {
            let _ = write!(
                buttons,
                r#"<button type="button" data-action="{action}" data-filename="{name}">{action}</button>"#
            );
        }
        let _ = writeln!(
            html,
            r#"<figure class="card"><a href="{path}"><img src="{path}" alt="{title}" loading="lazy"></a><figcaption>{title}<dl>{details}</dl>{buttons}</figcaption></figure>"#,
            path = escape(&file.path),
        );
    }
    html
}

/// Escapes text for use in HTML content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::PosterMetadata;

    fn page() -> IndexPage {
        let mut meta = PosterMetadata::new();
        meta.insert("Title".into(), "Oslo <Noir>".into());
        meta.insert("DistanceMeters".into(), "5000".into());
        IndexPage {
            themes: vec!["feature_based".into(), "noir".into()],
            examples: vec![ExamplePoster {
                theme: "noir".into(),
                filename: "racksta_1000m_noir.png".into(),
                path: "/examples/racksta_1000m_noir.png".into(),
            }],
            posters: vec![PosterFile {
                filename: "oslo.png".into(),
                path: "/posters/oslo.png".into(),
                meta,
            }],
            trash: Vec::new(),
            values: IndexPage::default_values(),
            outcome: Outcome::Empty,
        }
    }

    #[test]
    fn escape_handles_markup() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn template_is_embedded() {
        assert!(Assets::get(INDEX_TEMPLATE).is_some());
        assert!(Assets::get("static/app.js").is_some());
        assert!(Assets::get("static/style.css").is_some());
    }

    #[test]
    fn render_fills_every_placeholder() {
        let html = page().render();
        assert!(!html.contains("{{"));
        assert!(html.contains(r#"<option value="feature_based" selected>feature_based</option>"#));
        assert!(html.contains(r#"<option value="noir">noir</option>"#));
        assert!(html.contains(r#"value="29000""#));
        assert!(html.contains("/examples/racksta_1000m_noir.png"));
        assert!(html.contains("Oslo &lt;Noir&gt;"));
        assert!(html.contains(r#"data-action="delete" data-filename="oslo.png""#));
        assert!(html.contains("Nothing here yet."));
    }

    #[test]
    fn render_shows_outcome() {
        let mut page = page();
        page.outcome = Outcome::Failed("Theme not found.".into());
        assert!(page.render().contains(r#"<p class="error">Theme not found.</p>"#));

        page.outcome = Outcome::Generated(GeneratedPoster {
            filename: "oslo_noir.png".into(),
            path: "/posters/oslo_noir.png".into(),
        });
        assert!(page
            .render()
            .contains(r#"<a href="/posters/oslo_noir.png">oslo_noir.png</a>"#));
    }

    #[test]
    fn user_values_are_escaped() {
        let mut page = page();
        page.values.city = r#""><script>"#.into();
        let html = page.render();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
    }
}
