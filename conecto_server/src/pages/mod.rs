//! Landing page renderer.
//!
//! Pure functions from landing-page state to an HTML document. The same
//! renderer backs the editor preview and the public handle page, so the
//! output must depend on nothing but the inputs.

use crate::preferences::{ColorPalette, SubscriptionTier};

/// Everything the renderer needs for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct LandingPage<'a> {
    pub logo: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub colors: &'a ColorPalette,
    pub tiers: &'a [SubscriptionTier],
}

/// Render a creator's landing page.
pub fn render_landing_page(page: &LandingPage<'_>) -> String {
    let mut cards = String::new();
    for tier in page.tiers {
        cards.push_str(&format!(
            r#"      <div class="tier" style="border: 1px solid {secondary}">
        <h3 style="color: {primary}">{name}</h3>
        <p class="price">&euro;{price}</p>
        <p class="tier-description">{description}</p>
        <button style="background-color: {primary}">Subscribe</button>
      </div>
"#,
            secondary = escape(&page.colors.secondary),
            primary = escape(&page.colors.primary),
            name = escape(&tier.name),
            price = tier.price,
            description = escape(&tier.description),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <style>
    body {{ margin: 0; font-family: sans-serif; background-color: {background}; color: {text}; }}
    main {{ display: flex; flex-direction: column; align-items: center; padding: 2rem; }}
    img.logo {{ height: 96px; width: 96px; border-radius: 50%; object-fit: cover; }}
    h1 {{ color: {primary}; }}
    p.description {{ max-width: 28rem; text-align: center; }}
    .tiers {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(16rem, 1fr)); gap: 1rem; width: 100%; max-width: 56rem; margin-top: 2rem; }}
    .tier {{ border-radius: 0.5rem; padding: 1rem; }}
    .tier .price {{ font-size: 1.5rem; font-weight: bold; }}
    .tier button {{ width: 100%; margin-top: 1rem; padding: 0.5rem; border: none; border-radius: 0.375rem; color: {background}; cursor: pointer; }}
  </style>
</head>
<body>
  <main>
    <img class="logo" src="{logo}" alt="Logo">
    <h1>{name}</h1>
    <p class="description">{description}</p>
    <div class="tiers">
{cards}    </div>
  </main>
</body>
</html>
"#,
        title = escape(page.name),
        background = escape(&page.colors.background),
        text = escape(&page.colors.text),
        primary = escape(&page.colors.primary),
        logo = escape(page.logo),
        name = escape(page.name),
        description = escape(page.description),
        cards = cards,
    )
}

/// 404 page for a handle nobody has claimed.
pub fn render_not_found(handle: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Handle not found</title>
</head>
<body>
  <main style="font-family: sans-serif; text-align: center; padding: 4rem;">
    <h1>Nothing here yet</h1>
    <p>The handle <strong>{handle}</strong> has not been claimed.</p>
  </main>
</body>
</html>
"#,
        handle = escape(handle),
    )
}

/// Minimal HTML escaping for text and attribute positions.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
