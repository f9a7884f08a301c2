//! Typed content shapes, one per [`SectionType`].
//!
//! These are the *normalized* forms produced by [`crate::schema::validate`].
//! Raw editor input never deserializes into them directly; it goes through
//! the migrator and the registry first.

use serde::{Deserialize, Serialize};

use crate::{Result, section::SectionType};

// ─── Shared shapes ───────────────────────────────────────────────────────────

/// A reference to an image held by the external media store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
  pub url:      String,
  #[serde(default)]
  pub alt_text: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub width:    Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub height:   Option<u32>,
}

impl MediaRef {
  /// A bare reference to `url` with no alt text or dimensions.
  pub fn from_url(url: impl Into<String>) -> Self {
    Self { url: url.into(), alt_text: String::new(), width: None, height: None }
  }

  pub(crate) fn placeholder() -> Self { Self::from_url(String::new()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaButton {
  pub text:        String,
  pub href:        String,
  #[serde(default)]
  pub is_external: bool,
}

impl CtaButton {
  pub const DEFAULT_TEXT: &'static str = "Get Started";
  /// Used when a button object is present but has no `href`.
  pub const DEFAULT_HREF: &'static str = "/";
  /// Used when a required button is missing entirely.
  pub const DEFAULT_TARGET: &'static str = "/contact";
}

impl Default for CtaButton {
  fn default() -> Self {
    Self {
      text:        Self::DEFAULT_TEXT.to_owned(),
      href:        Self::DEFAULT_TARGET.to_owned(),
      is_external: false,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
  pub label:       String,
  pub href:        String,
  #[serde(default)]
  pub is_external: bool,
}

impl NavItem {
  fn internal(label: &str, href: &str) -> Self {
    Self { label: label.to_owned(), href: href.to_owned(), is_external: false }
  }
}

// ─── Per-section shapes ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavbarContent {
  pub brand_name: String,
  #[serde(default)]
  pub logo:       Option<MediaRef>,
  #[serde(default)]
  pub items:      Vec<NavItem>,
  #[serde(default)]
  pub cta_button: Option<CtaButton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroContent {
  pub headline:         String,
  pub subheadline:      String,
  #[serde(default)]
  pub cta_button:       CtaButton,
  #[serde(default)]
  pub secondary_button: Option<CtaButton>,
  #[serde(default)]
  pub background_image: Option<MediaRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
  pub value: String,
  pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutContent {
  pub title:       String,
  pub description: String,
  #[serde(default)]
  pub image:       Option<MediaRef>,
  #[serde(default)]
  pub stats:       Vec<Stat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
  pub title:       String,
  pub description: String,
  #[serde(default)]
  pub icon:        Option<String>,
  #[serde(default)]
  pub href:        Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesContent {
  pub title:    String,
  #[serde(default)]
  pub subtitle: Option<String>,
  #[serde(default)]
  pub items:    Vec<ServiceItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub title:       String,
  #[serde(default)]
  pub category:    Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  pub image:       MediaRef,
  #[serde(default)]
  pub href:        Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioContent {
  pub title:    String,
  #[serde(default)]
  pub subtitle: Option<String>,
  #[serde(default)]
  pub projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientLogo {
  #[serde(default)]
  pub name: Option<String>,
  pub logo: MediaRef,
  #[serde(default)]
  pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarqueeClientsContent {
  #[serde(default)]
  pub title:         Option<String>,
  #[serde(default)]
  pub clients:       Vec<ClientLogo>,
  /// Seconds for one full scroll of the marquee.
  #[serde(default = "MarqueeClientsContent::default_speed")]
  pub speed_seconds: u32,
}

impl MarqueeClientsContent {
  pub const DEFAULT_SPEED: u32 = 30;

  fn default_speed() -> u32 { Self::DEFAULT_SPEED }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
  pub name: String,
  pub logo: MediaRef,
  #[serde(default)]
  pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalPartnersContent {
  pub title:       String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub partners:    Vec<Partner>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaContent {
  pub title:            String,
  #[serde(default)]
  pub description:      Option<String>,
  #[serde(default)]
  pub cta_button:       CtaButton,
  #[serde(default)]
  pub background_image: Option<MediaRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FooterColumn {
  pub title: String,
  #[serde(default)]
  pub links: Vec<NavItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
  pub platform: String,
  pub href:     String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterContent {
  pub brand_name:   String,
  #[serde(default)]
  pub tagline:      Option<String>,
  #[serde(default)]
  pub columns:      Vec<FooterColumn>,
  #[serde(default)]
  pub social_links: Vec<SocialLink>,
  #[serde(default = "FooterContent::default_copyright")]
  pub copyright:    String,
}

impl FooterContent {
  pub const DEFAULT_COPYRIGHT: &'static str = "All rights reserved.";

  fn default_copyright() -> String { Self::DEFAULT_COPYRIGHT.to_owned() }
}

// ─── SectionContent ──────────────────────────────────────────────────────────

/// Normalized content for any section. The variant always agrees with the
/// owning section's [`SectionType`].
///
/// Serializes as the bare inner payload; the section type travels alongside
/// it (in the `section_type` column or the enclosing JSON object).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionContent {
  Navbar(NavbarContent),
  Hero(HeroContent),
  About(AboutContent),
  Services(ServicesContent),
  Portfolio(PortfolioContent),
  MarqueeClients(MarqueeClientsContent),
  DigitalPartners(DigitalPartnersContent),
  Cta(CtaContent),
  Footer(FooterContent),
}

impl SectionContent {
  pub fn section_type(&self) -> SectionType {
    match self {
      Self::Navbar(_) => SectionType::Navbar,
      Self::Hero(_) => SectionType::Hero,
      Self::About(_) => SectionType::About,
      Self::Services(_) => SectionType::Services,
      Self::Portfolio(_) => SectionType::Portfolio,
      Self::MarqueeClients(_) => SectionType::MarqueeClients,
      Self::DigitalPartners(_) => SectionType::DigitalPartners,
      Self::Cta(_) => SectionType::Cta,
      Self::Footer(_) => SectionType::Footer,
    }
  }

  /// Serialise the payload for the `content_json` database column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(self)?)
  }

  /// Rebuild content from a stored section type and JSON payload.
  pub fn from_parts(
    section_type: SectionType,
    data: serde_json::Value,
  ) -> Result<Self> {
    Ok(match section_type {
      SectionType::Navbar => Self::Navbar(serde_json::from_value(data)?),
      SectionType::Hero => Self::Hero(serde_json::from_value(data)?),
      SectionType::About => Self::About(serde_json::from_value(data)?),
      SectionType::Services => Self::Services(serde_json::from_value(data)?),
      SectionType::Portfolio => Self::Portfolio(serde_json::from_value(data)?),
      SectionType::MarqueeClients => {
        Self::MarqueeClients(serde_json::from_value(data)?)
      }
      SectionType::DigitalPartners => {
        Self::DigitalPartners(serde_json::from_value(data)?)
      }
      SectionType::Cta => Self::Cta(serde_json::from_value(data)?),
      SectionType::Footer => Self::Footer(serde_json::from_value(data)?),
    })
  }

  /// Content used for a section's first write when the caller supplies none,
  /// and for public reads of a section that was never published.
  pub fn default_for(section_type: SectionType) -> Self {
    match section_type {
      SectionType::Navbar => Self::Navbar(NavbarContent {
        brand_name: "Studio".to_owned(),
        logo:       None,
        items:      vec![
          NavItem::internal("Home", "/"),
          NavItem::internal("About", "/#about"),
          NavItem::internal("Services", "/#services"),
          NavItem::internal("Portfolio", "/#portfolio"),
          NavItem::internal("Contact", "/contact"),
        ],
        cta_button: Some(CtaButton::default()),
      }),
      SectionType::Hero => Self::Hero(HeroContent {
        headline:         "We build digital experiences".to_owned(),
        subheadline:      "Design, development and strategy for brands \
                           that want to stand out."
          .to_owned(),
        cta_button:       CtaButton::default(),
        secondary_button: None,
        background_image: None,
      }),
      SectionType::About => Self::About(AboutContent {
        title:       "About us".to_owned(),
        description: "Tell visitors who you are and what you do.".to_owned(),
        image:       None,
        stats:       Vec::new(),
      }),
      SectionType::Services => Self::Services(ServicesContent {
        title:    "Our services".to_owned(),
        subtitle: None,
        items:    Vec::new(),
      }),
      SectionType::Portfolio => Self::Portfolio(PortfolioContent {
        title:    "Our work".to_owned(),
        subtitle: None,
        projects: Vec::new(),
      }),
      SectionType::MarqueeClients => {
        Self::MarqueeClients(MarqueeClientsContent {
          title:         None,
          clients:       Vec::new(),
          speed_seconds: MarqueeClientsContent::DEFAULT_SPEED,
        })
      }
      SectionType::DigitalPartners => {
        Self::DigitalPartners(DigitalPartnersContent {
          title:       "Our partners".to_owned(),
          description: None,
          partners:    Vec::new(),
        })
      }
      SectionType::Cta => Self::Cta(CtaContent {
        title:            "Ready to start your project?".to_owned(),
        description:      None,
        cta_button:       CtaButton::default(),
        background_image: None,
      }),
      SectionType::Footer => Self::Footer(FooterContent {
        brand_name:   "Studio".to_owned(),
        tagline:      None,
        columns:      Vec::new(),
        social_links: Vec::new(),
        copyright:    FooterContent::DEFAULT_COPYRIGHT.to_owned(),
      }),
    }
  }
}
