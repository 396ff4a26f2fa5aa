// ── Compose links ──
//
// Serializes the recipient fields into a `mailto:` URI or an Outlook on the
// web calendar deep link.

use url::Url;

use crate::recipients::Recipients;

/// Outlook on the web "new event" deep link.
pub const EVENT_COMPOSE_URL: &str = "https://outlook.office.com/calendar/deeplink/compose";

/// Email needs at least one non-blank field.
pub fn can_compose_email(r: &Recipients) -> bool {
    !r.is_empty()
}

/// Events need To or Cc, and no Bcc: the deep link has no Bcc parameter.
pub fn can_compose_event(r: &Recipients) -> bool {
    let has_attendees = !r.to.trim().is_empty() || !r.cc.trim().is_empty();
    has_attendees && r.bcc.trim().is_empty()
}

/// `mailto:?to=..&cc=..&bcc=..` with only the non-empty fields.
pub fn mailto_url(r: &Recipients) -> Option<String> {
    if !can_compose_email(r) {
        return None;
    }

    let params: Vec<String> = [("to", &r.to), ("cc", &r.cc), ("bcc", &r.bcc)]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect();

    Some(format!("mailto:?{}", params.join("&")))
}

/// The calendar deep link with `to` and `cc` (both always present).
pub fn event_url(r: &Recipients) -> Option<Url> {
    if !can_compose_event(r) {
        return None;
    }

    let mut url = Url::parse(EVENT_COMPOSE_URL).ok()?;
    url.query_pairs_mut()
        .append_pair("to", &r.to)
        .append_pair("cc", &r.cc);
    Some(url)
}
