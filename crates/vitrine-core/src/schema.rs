//! The schema registry: one validation contract per [`SectionType`].
//!
//! [`validate`] is total over arbitrary JSON. It never panics; every problem
//! becomes a [`FieldError`] addressed by a dotted path (`ctaButton.href`,
//! `items[2].label`) so an editor can highlight the offending input.
//!
//! Optional nested objects that are present but partial are filled in with
//! per-field defaults instead of failing:
//!
//! | field | default |
//! |-------|---------|
//! | button `text` | `"Get Started"` |
//! | button `href` | `"/"` |
//! | button / nav item `isExternal` | `false` |
//! | media `altText` | `""` |
//! | required button (hero, cta) missing entirely | `{"Get Started", "/contact", false}` |
//! | marquee `speedSeconds` | `30` |
//! | footer `copyright` | `"All rights reserved."` |
//!
//! A field that is present but empty is an error, not a default.

use std::{fmt, ops::RangeInclusive};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
  content::{
    AboutContent, ClientLogo, CtaButton, CtaContent, DigitalPartnersContent,
    FooterColumn, FooterContent, HeroContent, MarqueeClientsContent, MediaRef,
    NavItem, NavbarContent, Partner, PortfolioContent, Project, SectionContent,
    ServiceItem, ServicesContent, SocialLink, Stat,
  },
  migrate,
  section::SectionType,
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// One problem with one field. An empty `path` refers to the content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub path:    String,
  pub message: String,
}

/// Every problem found in one piece of content, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn fields(&self) -> &[FieldError] { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  /// The first error reported for exactly `path`.
  pub fn at(&self, path: &str) -> Option<&FieldError> {
    self.0.iter().find(|e| e.path == path)
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, e) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      if e.path.is_empty() {
        write!(f, "{}", e.message)?;
      } else {
        write!(f, "{}: {}", e.path, e.message)?;
      }
    }
    Ok(())
  }
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// Validate `content` against the contract for `section_type`.
pub fn validate(
  section_type: SectionType,
  content: &Value,
) -> Result<SectionContent, ValidationErrors> {
  let mut c = Checker::default();

  let normalized = match content {
    Value::Object(o) => Some(match section_type {
      SectionType::Navbar => SectionContent::Navbar(navbar(&mut c, o)),
      SectionType::Hero => SectionContent::Hero(hero(&mut c, o)),
      SectionType::About => SectionContent::About(about(&mut c, o)),
      SectionType::Services => SectionContent::Services(services(&mut c, o)),
      SectionType::Portfolio => SectionContent::Portfolio(portfolio(&mut c, o)),
      SectionType::MarqueeClients => {
        SectionContent::MarqueeClients(marquee_clients(&mut c, o))
      }
      SectionType::DigitalPartners => {
        SectionContent::DigitalPartners(digital_partners(&mut c, o))
      }
      SectionType::Cta => SectionContent::Cta(cta(&mut c, o)),
      SectionType::Footer => SectionContent::Footer(footer(&mut c, o)),
    }),
    _ => {
      c.fail(String::new(), "content must be an object");
      None
    }
  };

  match normalized {
    Some(content) if c.errors.is_empty() => Ok(content),
    _ => Err(ValidationErrors(c.errors)),
  }
}

/// Migrate legacy shapes, then validate. This is the path all editor input
/// takes before it reaches the store.
pub fn normalize(
  section_type: SectionType,
  raw: Value,
) -> Result<SectionContent, ValidationErrors> {
  validate(section_type, &migrate::migrate(section_type, raw))
}

/// Content that passes [`validate`] with no caller input at all.
pub fn default_content(section_type: SectionType) -> SectionContent {
  SectionContent::default_for(section_type)
}

// ─── Per-section contracts ───────────────────────────────────────────────────

fn navbar(c: &mut Checker, o: &Object) -> NavbarContent {
  NavbarContent {
    brand_name: c.text(o, "", "brandName", 100),
    logo:       c.optional_media(o, "", "logo"),
    items:      c.list(o, "", "items", 8, Checker::nav_item),
    cta_button: c.optional_button(o, "", "ctaButton"),
  }
}

fn hero(c: &mut Checker, o: &Object) -> HeroContent {
  HeroContent {
    headline:         c.text(o, "", "headline", 200),
    subheadline:      c.text(o, "", "subheadline", 500),
    cta_button:       c.required_button(o, "", "ctaButton"),
    secondary_button: c.optional_button(o, "", "secondaryButton"),
    background_image: c.optional_media(o, "", "backgroundImage"),
  }
}

fn about(c: &mut Checker, o: &Object) -> AboutContent {
  AboutContent {
    title:       c.text(o, "", "title", 200),
    description: c.text(o, "", "description", 2000),
    image:       c.optional_media(o, "", "image"),
    stats:       c.list(o, "", "stats", 6, |c, p, s| Stat {
      value: c.text(s, p, "value", 20),
      label: c.text(s, p, "label", 50),
    }),
  }
}

fn services(c: &mut Checker, o: &Object) -> ServicesContent {
  ServicesContent {
    title:    c.text(o, "", "title", 200),
    subtitle: c.optional_text(o, "", "subtitle", 500),
    items:    c.list(o, "", "items", 12, |c, p, s| ServiceItem {
      title:       c.text(s, p, "title", 100),
      description: c.text(s, p, "description", 500),
      icon:        c.optional_text(s, p, "icon", 50),
      href:        c.optional_href(s, p, "href"),
    }),
  }
}

fn portfolio(c: &mut Checker, o: &Object) -> PortfolioContent {
  PortfolioContent {
    title:    c.text(o, "", "title", 200),
    subtitle: c.optional_text(o, "", "subtitle", 500),
    projects: c.list(o, "", "projects", 24, |c, p, s| Project {
      title:       c.text(s, p, "title", 100),
      category:    c.optional_text(s, p, "category", 50),
      description: c.optional_text(s, p, "description", 500),
      image:       c.required_media(s, p, "image"),
      href:        c.optional_href(s, p, "href"),
    }),
  }
}

fn marquee_clients(c: &mut Checker, o: &Object) -> MarqueeClientsContent {
  MarqueeClientsContent {
    title:         c.optional_text(o, "", "title", 200),
    clients:       c.list(o, "", "clients", 40, |c, p, s| ClientLogo {
      name: c.optional_text(s, p, "name", 100),
      logo: c.required_media(s, p, "logo"),
      href: c.optional_href(s, p, "href"),
    }),
    speed_seconds: c.number_in(
      o,
      "",
      "speedSeconds",
      5..=300,
      MarqueeClientsContent::DEFAULT_SPEED,
    ),
  }
}

fn digital_partners(c: &mut Checker, o: &Object) -> DigitalPartnersContent {
  DigitalPartnersContent {
    title:       c.text(o, "", "title", 200),
    description: c.optional_text(o, "", "description", 500),
    partners:    c.list(o, "", "partners", 20, |c, p, s| Partner {
      name: c.text(s, p, "name", 100),
      logo: c.required_media(s, p, "logo"),
      href: c.optional_href(s, p, "href"),
    }),
  }
}

fn cta(c: &mut Checker, o: &Object) -> CtaContent {
  CtaContent {
    title:            c.text(o, "", "title", 200),
    description:      c.optional_text(o, "", "description", 500),
    cta_button:       c.required_button(o, "", "ctaButton"),
    background_image: c.optional_media(o, "", "backgroundImage"),
  }
}

fn footer(c: &mut Checker, o: &Object) -> FooterContent {
  FooterContent {
    brand_name:   c.text(o, "", "brandName", 100),
    tagline:      c.optional_text(o, "", "tagline", 300),
    columns:      c.list(o, "", "columns", 5, |c, p, s| FooterColumn {
      title: c.text(s, p, "title", 50),
      links: c.list(s, p, "links", 10, Checker::nav_item),
    }),
    social_links: c.list(o, "", "socialLinks", 10, |c, p, s| SocialLink {
      platform: c.text(s, p, "platform", 30),
      href:     c.href(s, p, "href"),
    }),
    copyright:    c.text_or(
      o,
      "",
      "copyright",
      200,
      FooterContent::DEFAULT_COPYRIGHT,
    ),
  }
}

// ─── Checker ─────────────────────────────────────────────────────────────────

type Object = Map<String, Value>;

const MAX_URL_LEN: usize = 2048;

fn at(parent: &str, key: &str) -> String {
  if parent.is_empty() {
    key.to_owned()
  } else {
    format!("{parent}.{key}")
  }
}

/// Relative paths, fragments, and a small set of absolute schemes.
fn is_valid_href(s: &str) -> bool {
  if s.chars().any(char::is_whitespace) {
    return false;
  }
  if s.starts_with('/') || s.starts_with('#') {
    return true;
  }
  match s.split_once(':') {
    Some((scheme, rest)) => match scheme.to_ascii_lowercase().as_str() {
      "http" | "https" => rest.len() > 2 && rest.starts_with("//"),
      "mailto" | "tel" => !rest.is_empty(),
      _ => false,
    },
    None => false,
  }
}

/// Accumulates field errors while building a normalized value. Values built
/// alongside errors are placeholders and are discarded by [`validate`].
#[derive(Default)]
struct Checker {
  errors: Vec<FieldError>,
}

impl Checker {
  fn fail(&mut self, path: String, message: impl Into<String>) {
    self.errors.push(FieldError { path, message: message.into() });
  }

  /// A present, non-blank string no longer than `max`, trimmed.
  fn present_text(&mut self, path: String, v: &Value, max: usize) -> String {
    match v {
      Value::String(s) => {
        let trimmed = s.trim();
        if trimmed.is_empty() {
          self.fail(path, "must not be empty");
        } else if trimmed.chars().count() > max {
          self.fail(path, format!("must be at most {max} characters"));
        }
        trimmed.to_owned()
      }
      _ => {
        self.fail(path, "must be a string");
        String::new()
      }
    }
  }

  fn text(&mut self, o: &Object, parent: &str, key: &str, max: usize) -> String {
    let path = at(parent, key);
    match o.get(key) {
      None | Some(Value::Null) => {
        self.fail(path, "is required");
        String::new()
      }
      Some(v) => self.present_text(path, v, max),
    }
  }

  fn text_or(
    &mut self,
    o: &Object,
    parent: &str,
    key: &str,
    max: usize,
    default: &str,
  ) -> String {
    match o.get(key) {
      None | Some(Value::Null) => default.to_owned(),
      Some(v) => self.present_text(at(parent, key), v, max),
    }
  }

  /// Missing, null, and blank strings all read as "not set".
  fn optional_text(
    &mut self,
    o: &Object,
    parent: &str,
    key: &str,
    max: usize,
  ) -> Option<String> {
    match o.get(key) {
      None | Some(Value::Null) => None,
      Some(Value::String(s)) if s.trim().is_empty() => None,
      Some(v) => Some(self.present_text(at(parent, key), v, max)),
    }
  }

  fn checked_href(&mut self, path: String, v: &Value) -> String {
    let s = self.present_text(path.clone(), v, MAX_URL_LEN);
    if !s.is_empty() && !is_valid_href(&s) {
      self.fail(path, "must be a relative path or an http(s), mailto or tel URL");
    }
    s
  }

  fn href(&mut self, o: &Object, parent: &str, key: &str) -> String {
    let path = at(parent, key);
    match o.get(key) {
      None | Some(Value::Null) => {
        self.fail(path, "is required");
        String::new()
      }
      Some(v) => self.checked_href(path, v),
    }
  }

  fn href_or(
    &mut self,
    o: &Object,
    parent: &str,
    key: &str,
    default: &str,
  ) -> String {
    match o.get(key) {
      None | Some(Value::Null) => default.to_owned(),
      Some(v) => self.checked_href(at(parent, key), v),
    }
  }

  fn optional_href(
    &mut self,
    o: &Object,
    parent: &str,
    key: &str,
  ) -> Option<String> {
    match o.get(key) {
      None | Some(Value::Null) => None,
      Some(Value::String(s)) if s.trim().is_empty() => None,
      Some(v) => Some(self.checked_href(at(parent, key), v)),
    }
  }

  fn flag(&mut self, o: &Object, parent: &str, key: &str) -> bool {
    match o.get(key) {
      None | Some(Value::Null) => false,
      Some(Value::Bool(b)) => *b,
      Some(_) => {
        self.fail(at(parent, key), "must be true or false");
        false
      }
    }
  }

  fn dimension(&mut self, o: &Object, parent: &str, key: &str) -> Option<u32> {
    match o.get(key) {
      None | Some(Value::Null) => None,
      Some(v) => match v.as_u64().and_then(|n| u32::try_from(n).ok()) {
        Some(n) if n > 0 => Some(n),
        _ => {
          self.fail(at(parent, key), "must be a positive integer");
          None
        }
      },
    }
  }

  fn number_in(
    &mut self,
    o: &Object,
    parent: &str,
    key: &str,
    range: RangeInclusive<u32>,
    default: u32,
  ) -> u32 {
    match o.get(key) {
      None | Some(Value::Null) => default,
      Some(v) => match v.as_u64().and_then(|n| u32::try_from(n).ok()) {
        Some(n) if range.contains(&n) => n,
        _ => {
          self.fail(
            at(parent, key),
            format!(
              "must be an integer between {} and {}",
              range.start(),
              range.end()
            ),
          );
          default
        }
      },
    }
  }

  /// An array of objects with at most `max` entries. Every entry is checked
  /// even when the cap is exceeded so all problems surface at once.
  fn list<T>(
    &mut self,
    o: &Object,
    parent: &str,
    key: &str,
    max: usize,
    mut item: impl FnMut(&mut Self, &str, &Object) -> T,
  ) -> Vec<T> {
    let path = at(parent, key);
    let entries = match o.get(key) {
      None | Some(Value::Null) => return Vec::new(),
      Some(Value::Array(a)) => a,
      Some(_) => {
        self.fail(path, "must be a list");
        return Vec::new();
      }
    };

    if entries.len() > max {
      self.fail(path.clone(), format!("must have at most {max} items"));
    }

    let mut out = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
      let entry_path = format!("{path}[{i}]");
      match entry {
        Value::Object(e) => out.push(item(self, &entry_path, e)),
        _ => self.fail(entry_path, "must be an object"),
      }
    }
    out
  }

  fn media(&mut self, path: &str, v: &Value) -> MediaRef {
    let Value::Object(m) = v else {
      self.fail(path.to_owned(), "must be an image reference");
      return MediaRef::placeholder();
    };

    let url_path = at(path, "url");
    let url = match m.get("url") {
      None | Some(Value::Null) => {
        self.fail(url_path, "is required");
        String::new()
      }
      Some(u) => {
        let u = self.present_text(url_path.clone(), u, MAX_URL_LEN);
        if u.chars().any(char::is_whitespace) {
          self.fail(url_path, "must not contain whitespace");
        }
        u
      }
    };

    let alt_text = match m.get("altText") {
      None | Some(Value::Null) => String::new(),
      Some(Value::String(s)) if s.trim().is_empty() => String::new(),
      Some(a) => self.present_text(at(path, "altText"), a, 300),
    };

    MediaRef {
      url,
      alt_text,
      width: self.dimension(m, path, "width"),
      height: self.dimension(m, path, "height"),
    }
  }

  fn required_media(&mut self, o: &Object, parent: &str, key: &str) -> MediaRef {
    let path = at(parent, key);
    match o.get(key) {
      None | Some(Value::Null) => {
        self.fail(path, "is required");
        MediaRef::placeholder()
      }
      Some(v) => self.media(&path, v),
    }
  }

  fn optional_media(
    &mut self,
    o: &Object,
    parent: &str,
    key: &str,
  ) -> Option<MediaRef> {
    match o.get(key) {
      None | Some(Value::Null) => None,
      Some(v) => Some(self.media(&at(parent, key), v)),
    }
  }

  fn button(&mut self, path: &str, v: &Value) -> CtaButton {
    let Value::Object(b) = v else {
      self.fail(path.to_owned(), "must be a button object");
      return CtaButton::default();
    };
    CtaButton {
      text:        self.text_or(b, path, "text", 50, CtaButton::DEFAULT_TEXT),
      href:        self.href_or(b, path, "href", CtaButton::DEFAULT_HREF),
      is_external: self.flag(b, path, "isExternal"),
    }
  }

  /// A missing required button is replaced wholesale by the default button.
  fn required_button(&mut self, o: &Object, parent: &str, key: &str) -> CtaButton {
    match o.get(key) {
      None | Some(Value::Null) => CtaButton::default(),
      Some(v) => self.button(&at(parent, key), v),
    }
  }

  fn optional_button(
    &mut self,
    o: &Object,
    parent: &str,
    key: &str,
  ) -> Option<CtaButton> {
    match o.get(key) {
      None | Some(Value::Null) => None,
      Some(v) => Some(self.button(&at(parent, key), v)),
    }
  }

  fn nav_item(&mut self, path: &str, o: &Object) -> NavItem {
    NavItem {
      label:       self.text(o, path, "label", 50),
      href:        self.href(o, path, "href"),
      is_external: self.flag(o, path, "isExternal"),
    }
  }
}
