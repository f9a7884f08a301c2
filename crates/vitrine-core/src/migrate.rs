//! Rewrites content stored by older editors into the current shape.
//!
//! Every rule fires only when its legacy shape is present and removes that
//! shape as it goes, so migrating current content is a no-op and migrating
//! twice equals migrating once. Shapes no rule recognises are left alone for
//! [`crate::schema::validate`] to reject with a field-level error.
//!
//! When a legacy key and its replacement are both present, the replacement
//! wins and the legacy key is dropped.

use serde_json::{Map, Value, json};

use crate::section::SectionType;

type Object = Map<String, Value>;

/// Migrate `raw` content for `section_type` into the current shape.
pub fn migrate(section_type: SectionType, raw: Value) -> Value {
  let Value::Object(mut o) = raw else {
    return raw;
  };

  match section_type {
    SectionType::Navbar => {
      rename(&mut o, "links", "items");
      rename(&mut o, "logoUrl", "logo");
      media(&mut o, "logo");
      buttons(&mut o, "ctaButton", None);
      button(&mut o, "ctaButton");
      each(&mut o, "items", link);
    }
    SectionType::Hero => {
      rename(&mut o, "title", "headline");
      rename(&mut o, "subtitle", "subheadline");
      rename(&mut o, "backgroundImageUrl", "backgroundImage");
      rename(&mut o, "image", "backgroundImage");
      media(&mut o, "backgroundImage");
      buttons(&mut o, "ctaButton", Some("secondaryButton"));
      button(&mut o, "ctaButton");
      button(&mut o, "secondaryButton");
    }
    SectionType::About => {
      rename(&mut o, "headline", "title");
      rename(&mut o, "content", "description");
      rename(&mut o, "text", "description");
      rename(&mut o, "imageUrl", "image");
      media(&mut o, "image");
    }
    SectionType::Services => {
      rename(&mut o, "headline", "title");
      rename(&mut o, "services", "items");
      each(&mut o, "items", |s| {
        rename(s, "name", "title");
        rename(s, "link", "href");
        rename(s, "url", "href");
      });
    }
    SectionType::Portfolio => {
      rename(&mut o, "headline", "title");
      rename(&mut o, "items", "projects");
      each(&mut o, "projects", |p| {
        rename(p, "name", "title");
        rename(p, "imageUrl", "image");
        media(p, "image");
        rename(p, "link", "href");
        rename(p, "url", "href");
      });
    }
    SectionType::MarqueeClients => {
      rename(&mut o, "logos", "clients");
      rename(&mut o, "speed", "speedSeconds");
      bare_urls_to_objects(&mut o, "clients", "logo");
      each(&mut o, "clients", |c| {
        rename(c, "logoUrl", "logo");
        rename(c, "src", "logo");
        rename(c, "image", "logo");
        media(c, "logo");
        rename(c, "url", "href");
      });
    }
    SectionType::DigitalPartners => {
      rename(&mut o, "headline", "title");
      each(&mut o, "partners", |p| {
        rename(p, "logoUrl", "logo");
        rename(p, "image", "logo");
        media(p, "logo");
        rename(p, "url", "href");
        rename(p, "website", "href");
      });
    }
    SectionType::Cta => {
      rename(&mut o, "headline", "title");
      rename(&mut o, "subheadline", "description");
      rename(&mut o, "button", "ctaButton");
      buttons(&mut o, "ctaButton", None);
      button(&mut o, "ctaButton");
      rename(&mut o, "backgroundImageUrl", "backgroundImage");
      media(&mut o, "backgroundImage");
    }
    SectionType::Footer => {
      rename(&mut o, "companyName", "brandName");
      rename(&mut o, "socials", "socialLinks");
      each(&mut o, "socialLinks", |s| {
        rename(s, "name", "platform");
        rename(s, "url", "href");
      });
      each(&mut o, "columns", |c| each(c, "links", link));
    }
  }

  Value::Object(o)
}

// ─── Rules ───────────────────────────────────────────────────────────────────

fn rename(o: &mut Object, from: &str, to: &str) {
  if let Some(v) = o.remove(from) {
    o.entry(to).or_insert(v);
  }
}

/// Apply `f` to every object in the array at `key`.
fn each(o: &mut Object, key: &str, mut f: impl FnMut(&mut Object)) {
  if let Some(Value::Array(entries)) = o.get_mut(key) {
    for entry in entries {
      if let Value::Object(e) = entry {
        f(e);
      }
    }
  }
}

fn media_value(url: &str) -> Value { json!({ "url": url, "altText": "" }) }

/// Bare URL strings become media objects; blank strings mean "no image".
/// Media objects using `src`/`alt` are renamed to `url`/`altText`.
fn media(o: &mut Object, key: &str) {
  if let Some(Value::String(url)) = o.get(key) {
    if url.trim().is_empty() {
      o.remove(key);
    } else {
      let value = media_value(url);
      o.insert(key.to_owned(), value);
    }
  } else if let Some(Value::Object(m)) = o.get_mut(key) {
    rename(m, "src", "url");
    rename(m, "alt", "altText");
  }
}

/// Array entries that are bare, non-blank URL strings become `{field: media}`.
fn bare_urls_to_objects(o: &mut Object, key: &str, field: &str) {
  if let Some(Value::Array(entries)) = o.get_mut(key) {
    for entry in entries {
      if let Value::String(url) = entry
        && !url.trim().is_empty()
      {
        let mut wrapped = Object::new();
        wrapped.insert(field.to_owned(), media_value(url));
        *entry = Value::Object(wrapped);
      }
    }
  }
}

/// A legacy `buttons` array becomes the primary (and optionally secondary)
/// button object.
fn buttons(o: &mut Object, primary: &str, secondary: Option<&str>) {
  if !matches!(o.get("buttons"), Some(Value::Array(_))) {
    return;
  }
  let Some(Value::Array(list)) = o.remove("buttons") else {
    return;
  };

  let mut list = list.into_iter();
  if let Some(first) = list.next() {
    o.entry(primary).or_insert(first);
  }
  if let (Some(key), Some(second)) = (secondary, list.next()) {
    o.entry(key).or_insert(second);
  }
}

fn button(o: &mut Object, key: &str) {
  if let Some(Value::Object(b)) = o.get_mut(key) {
    rename(b, "label", "text");
    rename(b, "url", "href");
    rename(b, "link", "href");
    rename(b, "external", "isExternal");
  }
}

fn link(item: &mut Object) {
  rename(item, "name", "label");
  rename(item, "title", "label");
  rename(item, "url", "href");
  rename(item, "external", "isExternal");
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;
  use crate::schema::{self, validate};

  fn legacy_samples(section_type: SectionType) -> Vec<Value> {
    match section_type {
      SectionType::Navbar => vec![json!({
        "brandName": "Acme",
        "logoUrl": "/logo.svg",
        "links": [{ "name": "Home", "url": "/", "external": false }],
        "buttons": [{ "label": "Contact", "url": "/contact", "variant": "primary" }]
      })],
      SectionType::Hero => vec![
        json!({
          "headline": "Hi",
          "subtitle": "Sub",
          "backgroundImage": "https://cdn.example.com/bg.jpg",
          "buttons": [
            { "text": "Start", "href": "/start", "variant": "primary" },
            { "label": "Learn more", "link": "/about", "variant": "ghost" }
          ]
        }),
        json!({ "title": "Hi", "subheadline": "Sub", "image": "" }),
      ],
      SectionType::About => vec![json!({
        "headline": "About",
        "content": "Body",
        "text": "ignored",
        "imageUrl": { "src": "/a.png", "alt": "Team" }
      })],
      SectionType::Services => vec![json!({
        "headline": "Services",
        "services": [{ "name": "Design", "description": "UI", "link": "/design" }]
      })],
      SectionType::Portfolio => vec![json!({
        "headline": "Work",
        "items": [{ "name": "Site", "imageUrl": "/p.png", "url": "https://x.dev" }]
      })],
      SectionType::MarqueeClients => vec![json!({
        "logos": ["/c1.png", { "name": "C2", "src": "/c2.png" }, ""],
        "speed": 20
      })],
      SectionType::DigitalPartners => vec![json!({
        "headline": "Partners",
        "partners": [{ "name": "P", "logoUrl": "/p.svg", "website": "https://p.io" }]
      })],
      SectionType::Cta => vec![json!({
        "headline": "Ready?",
        "subheadline": "Let's talk",
        "button": { "label": "Contact", "url": "/contact" }
      })],
      SectionType::Footer => vec![json!({
        "companyName": "Acme",
        "socials": [{ "name": "GitHub", "url": "https://github.com/acme" }],
        "columns": [{ "title": "Company", "links": [{ "title": "About", "url": "/about" }] }]
      })],
    }
  }

  #[test]
  fn migration_is_idempotent() {
    for section_type in SectionType::iter() {
      let mut samples = legacy_samples(section_type);
      samples.push(schema::default_content(section_type).to_json().unwrap());
      samples.push(json!({ "unexpected": [1, { "buttons": "nope" }] }));

      for sample in samples {
        let once = migrate(section_type, sample);
        let twice = migrate(section_type, once.clone());
        assert_eq!(once, twice, "{section_type} migration is not idempotent");
      }
    }
  }

  #[test]
  fn current_content_is_unchanged() {
    for section_type in SectionType::iter() {
      let current = schema::default_content(section_type).to_json().unwrap();
      assert_eq!(migrate(section_type, current.clone()), current);
    }
  }

  #[test]
  fn legacy_samples_validate_after_migration() {
    for section_type in SectionType::iter() {
      for sample in legacy_samples(section_type) {
        let migrated = migrate(section_type, sample);
        if let Err(errs) = validate(section_type, &migrated) {
          // The blank marquee entry is deliberately left for validation.
          assert_eq!(section_type, SectionType::MarqueeClients, "{errs}");
          assert_eq!(errs.len(), 1);
          assert!(errs.at("clients[2]").is_some());
        }
      }
    }
  }

  #[test]
  fn hero_buttons_array_becomes_primary_and_secondary() {
    let migrated = migrate(SectionType::Hero, legacy_samples(SectionType::Hero)[0].clone());
    assert_eq!(migrated["subheadline"], "Sub");
    assert_eq!(migrated["backgroundImage"]["url"], "https://cdn.example.com/bg.jpg");
    assert_eq!(migrated["ctaButton"]["href"], "/start");
    assert_eq!(migrated["secondaryButton"]["text"], "Learn more");
    assert_eq!(migrated["secondaryButton"]["href"], "/about");
    assert!(migrated.get("buttons").is_none());
  }

  #[test]
  fn current_key_wins_over_legacy_key() {
    let migrated = migrate(
      SectionType::Cta,
      json!({ "title": "Current", "headline": "Old", "ctaButton": { "text": "A" }, "buttons": [{ "text": "B" }] }),
    );
    assert_eq!(migrated["title"], "Current");
    assert_eq!(migrated["ctaButton"]["text"], "A");
    assert!(migrated.get("headline").is_none());
    assert!(migrated.get("buttons").is_none());
  }

  #[test]
  fn unrecognised_shapes_pass_through() {
    assert_eq!(migrate(SectionType::Hero, json!("just text")), json!("just text"));
    assert_eq!(migrate(SectionType::Footer, Value::Null), Value::Null);

    let odd = json!({ "headline": "Hi", "ctaButton": 5, "buttons": "many" });
    assert_eq!(migrate(SectionType::Hero, odd.clone()), odd);
  }
}
