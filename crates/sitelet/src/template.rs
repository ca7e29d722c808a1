use maud::{DOCTYPE, Markup, PreEscaped, html};

const STYLE: &str = "
html { position: relative; min-height: 100%; }
body { margin-bottom: 60px; }
.footer { position: absolute; bottom: 0; width: 100%; height: 60px; background-color: #f5f5f5; }
.container .text-muted { margin: 20px 0; }
";

const BOOTSTRAP_CSS: &str = "https://maxcdn.bootstrapcdn.com/bootstrap/3.3.4/css/bootstrap.min.css";

/// The site's page layout.
///
/// Each hole of the layout is a field, so a page cannot fill a hole that
/// does not exist or misspell one.
#[derive(Clone, Debug, Default)]
pub struct MainTemplate {
    /// Text of the `<title>` element.
    pub title: String,
    /// `<li>` items placed in the navbar.
    pub menu_bar: Markup,
    /// Main content.
    pub body: Markup,
    /// Appended at the end of `<body>`.
    pub scripts: Markup,
}

impl MainTemplate {
    /// An empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the navbar items.
    pub fn menu_bar(mut self, menu_bar: Markup) -> Self {
        self.menu_bar = menu_bar;
        self
    }

    /// Set the main content.
    pub fn body(mut self, body: Markup) -> Self {
        self.body = body;
        self
    }

    /// Set the trailing scripts.
    pub fn scripts(mut self, scripts: Markup) -> Self {
        self.scripts = scripts;
        self
    }

    /// The filled-in layout.
    pub fn markup(self) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (self.title) }
                    link rel="stylesheet" href=(BOOTSTRAP_CSS);
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    nav class="navbar navbar-default navbar-static-top" {
                        div class="container" {
                            div class="navbar-header" {
                                button type="button" class="navbar-toggle collapsed"
                                    data-toggle="collapse" data-target="#navbar"
                                    aria-expanded="false" aria-controls="navbar" {
                                    span class="sr-only" { "Toggle navigation" }
                                    span class="icon-bar" {}
                                    span class="icon-bar" {}
                                }
                                a class="navbar-brand" href="#" { "Your App" }
                            }
                            div id="navbar" class="navbar-collapse collapse" {
                                ul class="nav navbar-nav" { (self.menu_bar) }
                            }
                        }
                    }
                    div class="container" { (self.body) }
                    footer class="footer" {
                        div class="container" {
                            p class="text-muted" { "Served by sitelet." }
                        }
                    }
                    (self.scripts)
                }
            }
        }
    }

    /// The filled-in layout as an HTML document.
    pub fn render(self) -> String {
        self.markup().into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_hole() {
        let html = MainTemplate::new()
            .title("Home")
            .menu_bar(html! { li { "menu" } })
            .body(html! { h1 { "body" } })
            .scripts(html! { script src="/app.js" {} })
            .render();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains(r#"<ul class="nav navbar-nav"><li>menu</li></ul>"#));
        assert!(html.contains(r#"<div class="container"><h1>body</h1></div>"#));
        assert!(html.contains(r#"<script src="/app.js"></script></body>"#));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn layout_keeps_fragment_links() {
        let html = MainTemplate::new().render();
        assert!(html.contains(r##"data-target="#navbar""##));
        assert!(html.contains(r##"<a class="navbar-brand" href="#">Your App</a>"##));
    }

    #[test]
    fn title_is_escaped() {
        let html = MainTemplate::new().title("<Home>").render();
        assert!(html.contains("<title>&lt;Home&gt;</title>"));
    }
}
