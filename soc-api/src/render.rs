//! Page Rendering
//!
//! Handlers hand a [`TemplateRenderer`] a template name and a
//! [`TemplateContext`] of fully materialized named values. [`HtmlRenderer`]
//! is the built-in renderer for the three pages this service serves.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use soc_core::schema::CURATED_STUDY_NUMBER;
use std::fmt::Write as _;
use thiserror::Error;

/// Study list page; context: `studies`.
pub const INDEX_TEMPLATE: &str = "index.html";

/// Study page; context: `study`, `treatments`, `measurements`, `animals`,
/// `group_labels`.
pub const STUDY_TEMPLATE: &str = "study.html";

/// Shared error page; empty context.
pub const ERROR_TEMPLATE: &str = "errorhandler.html";

/// Scripts the study page loads before handing over its data.
const STUDY_SCRIPTS: [&str; 3] = ["js/socplot.js", "js/spider-plot.js", "js/socstudy.js"];

/// Elements the plotting scripts draw into.
const PLOT_NODES: [&str; 5] = [
    "waterfall-plot",
    "treatment-group-plot",
    "spider-plot",
    "tgi-plot",
    "recist-info-panel",
];

static NULL: Value = Value::Null;

/// Colors allowed into a `style` attribute: a name or a hex triplet/sextet.
static SWATCH_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z]{1,32}|#[0-9A-Fa-f]{3}|#[0-9A-Fa-f]{6})$")
        .expect("Invalid swatch color regex")
});

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Template {template} needs context value {name}")]
    MissingValue { template: String, name: String },

    #[error("Context value {name} has the wrong shape: expected {expected}")]
    WrongShape { name: String, expected: &'static str },

    #[error("Context serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Formatting failed")]
    Format(#[from] std::fmt::Error),
}

/// Named values handed to a template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext(Map<String, Value>);

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` under `name`.
    pub fn with(mut self, name: &str, value: &impl Serialize) -> Result<Self, RenderError> {
        self.0.insert(name.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    /// Use the fields of a serializable struct as the named values.
    pub fn from_fields(value: &impl Serialize) -> Result<Self, RenderError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(RenderError::WrongShape {
                name: "context".to_string(),
                expected: "object",
            }),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn require(&self, template: &str, name: &str) -> Result<&Value, RenderError> {
        self.0.get(name).ok_or_else(|| RenderError::MissingValue {
            template: template.to_string(),
            name: name.to_string(),
        })
    }

    fn require_rows(&self, template: &str, name: &str) -> Result<Vec<&Map<String, Value>>, RenderError> {
        let wrong_shape = || RenderError::WrongShape {
            name: name.to_string(),
            expected: "array of objects",
        };
        self.require(template, name)?
            .as_array()
            .ok_or_else(wrong_shape)?
            .iter()
            .map(|row| row.as_object().ok_or_else(wrong_shape))
            .collect()
    }

    fn require_object(&self, template: &str, name: &str) -> Result<&Map<String, Value>, RenderError> {
        self.require(template, name)?
            .as_object()
            .ok_or_else(|| RenderError::WrongShape {
                name: name.to_string(),
                expected: "object",
            })
    }
}

/// Turns a template name and context into HTML.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String, RenderError>;
}

// ============================================================================
// BUILT-IN HTML RENDERER
// ============================================================================

/// Renderer for `index.html`, `study.html` and `errorhandler.html`.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    /// URL prefix static scripts are served under
    pub static_prefix: String,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self {
            static_prefix: "/static".to_string(),
        }
    }
}

impl TemplateRenderer for HtmlRenderer {
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String, RenderError> {
        match template {
            INDEX_TEMPLATE => self.render_index(context),
            STUDY_TEMPLATE => self.render_study(context),
            ERROR_TEMPLATE => self.render_error(),
            other => Err(RenderError::UnknownTemplate(other.to_string())),
        }
    }
}

impl HtmlRenderer {
    fn render_index(&self, context: &TemplateContext) -> Result<String, RenderError> {
        let studies = context.require_rows(INDEX_TEMPLATE, "studies")?;

        let mut body = String::new();
        writeln!(body, "<h1>Studies</h1>")?;
        if studies.is_empty() {
            writeln!(body, "<p>No studies available.</p>")?;
            return Ok(page("Studies", &body, ""));
        }

        let columns: Vec<&str> = studies[0].keys().map(String::as_str).collect();
        writeln!(body, "<table class=\"studies\">")?;
        write_header_row(&mut body, &columns)?;
        for study in &studies {
            write!(body, "<tr>")?;
            for column in &columns {
                let value = study.get(*column).unwrap_or(&NULL);
                if *column == CURATED_STUDY_NUMBER {
                    let number = display_value(value);
                    write!(
                        body,
                        "<td><a href=\"study/{}.html\">{}</a></td>",
                        urlencoding::encode(&number),
                        escape_html(&number)
                    )?;
                } else {
                    write!(body, "<td>{}</td>", escape_html(&display_value(value)))?;
                }
            }
            writeln!(body, "</tr>")?;
        }
        writeln!(body, "</table>")?;

        Ok(page("Studies", &body, ""))
    }

    fn render_study(&self, context: &TemplateContext) -> Result<String, RenderError> {
        let study = context.require_object(STUDY_TEMPLATE, "study")?;
        let group_labels = context.require_rows(STUDY_TEMPLATE, "group_labels")?;
        for name in ["treatments", "measurements", "animals"] {
            context.require_rows(STUDY_TEMPLATE, name)?;
        }

        let title = study
            .get(CURATED_STUDY_NUMBER)
            .map(display_value)
            .unwrap_or_else(|| "Study".to_string());

        let mut body = String::new();
        writeln!(body, "<p><a href=\"../index.html\">All studies</a></p>")?;
        writeln!(body, "<h1>{}</h1>", escape_html(&title))?;

        writeln!(body, "<table class=\"study\">")?;
        for (column, value) in study {
            writeln!(
                body,
                "<tr><th>{}</th><td>{}</td></tr>",
                escape_html(column),
                escape_html(&display_value(value))
            )?;
        }
        writeln!(body, "</table>")?;

        writeln!(body, "<h2>Groups</h2>")?;
        writeln!(body, "<table class=\"group-labels\">")?;
        write_header_row(&mut body, &["group_name", "drug", "is_control", "recist", "color"])?;
        for label in &group_labels {
            let cell = |name: &str| escape_html(&display_value(label.get(name).unwrap_or(&NULL)));
            let color = cell("color");
            let swatch = if SWATCH_COLOR.is_match(&color) {
                format!("<span class=\"swatch\" style=\"background:{}\"></span>", color)
            } else {
                String::new()
            };
            writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}{}</td></tr>",
                cell("group_name"),
                cell("drug"),
                cell("is_control"),
                cell("recist"),
                swatch,
                color
            )?;
        }
        writeln!(body, "</table>")?;

        for node in PLOT_NODES {
            writeln!(body, "<div id=\"{}\" class=\"plot\"></div>", node)?;
        }

        let mut scripts = String::new();
        for script in STUDY_SCRIPTS {
            writeln!(
                scripts,
                "<script src=\"{}/{}\"></script>",
                self.static_prefix.trim_end_matches('/'),
                script
            )?;
        }
        let data = serde_json::json!({
            "study": context.require(STUDY_TEMPLATE, "study")?,
            "treatments": context.require(STUDY_TEMPLATE, "treatments")?,
            "measurements": context.require(STUDY_TEMPLATE, "measurements")?,
            "animals": context.require(STUDY_TEMPLATE, "animals")?,
            "groupLabels": context.require(STUDY_TEMPLATE, "group_labels")?,
        });
        writeln!(
            scripts,
            "<script>if (window.socstudy) {{ socstudy.initStudyData({}); }}</script>",
            script_json(&data)?
        )?;

        Ok(page(&title, &body, &scripts))
    }

    fn render_error(&self) -> Result<String, RenderError> {
        let body = "<h1>Something went wrong</h1>\n\
                    <p>The page you asked for could not be shown.</p>\n\
                    <p><a href=\"/\">Back to the study list</a></p>\n";
        Ok(page("Error", body, ""))
    }
}

fn page(title: &str, body: &str, scripts: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n</head>\n<body>\n{}{}</body>\n</html>\n",
        escape_html(title),
        body,
        scripts
    )
}

fn write_header_row(out: &mut String, columns: &[&str]) -> std::fmt::Result {
    write!(out, "<tr>")?;
    for column in columns {
        write!(out, "<th>{}</th>", escape_html(column))?;
    }
    writeln!(out, "</tr>")
}

/// Cell text for a value: null is blank, strings are unquoted.
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// JSON safe to embed in an inline `<script>` block.
fn script_json(value: &Value) -> Result<String, RenderError> {
    Ok(serde_json::to_string(value)?
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}
