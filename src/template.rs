//! KML header/footer templates
//!
//! Headers use `$name` / `${name}` placeholders with `$$` as a literal dollar
//! sign. Footers are written verbatim.

use regex::{Captures, Regex};
use std::fs;
use std::sync::OnceLock;

use crate::config::TemplateSource;
use crate::error::{ConvertError, Result};

pub const BUILTIN_KML_HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\r\n",
    "<kml xmlns=\"http://www.opengis.net/kml/2.2\">\r\n",
    "<Document>\r\n",
    "<name>${document_name}</name>\r\n",
    "<Style id=\"track\">\r\n",
    "<LineStyle><color>ff0000ff</color><width>3</width></LineStyle>\r\n",
    "</Style>\r\n",
    "<Placemark>\r\n",
    "<name>${placemark_name}</name>\r\n",
    "<description>${description}</description>\r\n",
    "<styleUrl>#track</styleUrl>\r\n",
    "<LineString>\r\n",
    "<extrude>0</extrude>\r\n",
    "<tessellate>1</tessellate>\r\n",
    "<altitudeMode>absolute</altitudeMode>\r\n",
    "<coordinates>\r\n",
);

pub const BUILTIN_KML_FOOTER: &str = concat!(
    "</coordinates>\r\n",
    "</LineString>\r\n",
    "</Placemark>\r\n",
    "</Document>\r\n",
    "</kml>\r\n",
);

const PLACEHOLDER_PATTERN: &str =
    r"\$(?:(?P<escaped>\$)|(?P<named>[_A-Za-z][_A-Za-z0-9]*)|\{(?P<braced>[_A-Za-z][_A-Za-z0-9]*)\}|(?P<invalid>))";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"))
}

/// Values substituted into the header of one session document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    pub document_name: String,
    pub placemark_name: String,
    pub description: String,
}

impl Placeholders {
    /// All three names set to the session identifier
    pub fn for_session(session_id: &str) -> Self {
        Self {
            document_name: session_id.to_string(),
            placemark_name: session_id.to_string(),
            description: session_id.to_string(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "document_name" => Some(&self.document_name),
            "placemark_name" => Some(&self.placemark_name),
            "description" => Some(&self.description),
            _ => None,
        }
    }
}

/// Substitute placeholders in `template`
///
/// Unknown names and a `$` that starts no placeholder are errors.
pub fn substitute(template: &str, values: &Placeholders) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in placeholder_regex().captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        out.push_str(resolve(&caps, template, whole.start(), values)?);
        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}

fn resolve<'a>(
    caps: &Captures<'_>,
    template: &str,
    offset: usize,
    values: &'a Placeholders,
) -> Result<&'a str> {
    if caps.name("escaped").is_some() {
        return Ok("$");
    }
    if let Some(name) = caps.name("named").or_else(|| caps.name("braced")) {
        return values.get(name.as_str()).ok_or_else(|| {
            ConvertError::Template(format!("unknown placeholder '{}'", name.as_str()))
        });
    }
    let line = template[..offset].matches('\n').count() + 1;
    Err(ConvertError::Template(format!(
        "invalid placeholder on line {}",
        line
    )))
}

/// Header and footer text for every session document of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmlTemplate {
    header: String,
    footer: String,
}

impl Default for KmlTemplate {
    fn default() -> Self {
        Self {
            header: BUILTIN_KML_HEADER.to_string(),
            footer: BUILTIN_KML_FOOTER.to_string(),
        }
    }
}

impl KmlTemplate {
    /// Build from literal text, checking the header's placeholders up front
    pub fn new(header: impl Into<String>, footer: impl Into<String>) -> Result<Self> {
        let template = Self {
            header: header.into(),
            footer: footer.into(),
        };
        template.render_header("S000")?;
        Ok(template)
    }

    pub fn load(header: &TemplateSource, footer: &TemplateSource) -> Result<Self> {
        Self::new(
            read_source(header, BUILTIN_KML_HEADER)?,
            read_source(footer, BUILTIN_KML_FOOTER)?,
        )
    }

    pub fn render_header(&self, session_id: &str) -> Result<String> {
        substitute(&self.header, &Placeholders::for_session(session_id))
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }
}

/// File contents are taken as-is, line endings included
fn read_source(source: &TemplateSource, builtin: &str) -> Result<String> {
    match source {
        TemplateSource::Builtin => Ok(builtin.to_string()),
        TemplateSource::File(path) => fs::read_to_string(path).map_err(|err| {
            ConvertError::Template(format!("cannot read {}: {}", path.display(), err))
        }),
    }
}
