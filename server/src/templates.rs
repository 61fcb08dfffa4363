use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// The five-page template set. Pages are read once at startup; rendering
/// replaces `{name}` placeholders from a named mapping and splices the page
/// into the layout's `{content}` slot.
pub struct Templates {
    layout: String,
    publish: String,
    policy: String,
    show: String,
    error: String,
    size_limit: usize,
}

impl Templates {
    /// Reads every template from `dir`, failing fast if one is missing. The
    /// layout's `{sizeLimit}` placeholder is filled once here, in kilobytes.
    pub fn load(dir: &Path, size_limit: usize) -> Result<Self> {
        let read = |name: &str| {
            fs::read_to_string(dir.join(name))
                .with_context(|| format!("failed to read template {name}"))
        };

        let kilobytes = (size_limit + 512) / 1024;
        let layout = read("template.html")?.replacen("{sizeLimit}", &kilobytes.to_string(), 1);

        Ok(Self {
            layout,
            publish: read("publish.html")?,
            policy: read("policy.html")?,
            show: read("show.html")?,
            error: read("error.html")?,
            size_limit,
        })
    }

    /// The submission form, with the raw byte limit available to the form.
    pub fn index(&self) -> String {
        let limit = self.size_limit.to_string();
        self.render(&self.publish, &[("sizeLimit", limit.as_str())])
    }

    pub fn policy(&self) -> String {
        self.render(&self.policy, &[])
    }

    /// The show page with the document projection spliced in.
    pub fn show(&self, doc: &str) -> String {
        self.render(&self.show, &[("doc", doc)])
    }

    pub fn error(&self, message: &str) -> String {
        self.render(&self.error, &[("error", message)])
    }

    fn render(&self, page: &str, values: &[(&str, &str)]) -> String {
        let mut content = page.to_owned();
        for (name, value) in values {
            content = content.replacen(&format!("{{{name}}}"), value, 1);
        }
        self.layout.replacen("{content}", &content, 1)
    }
}
