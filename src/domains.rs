//! Domain and host utilities shared by the reputation signals and the
//! WHOIS client.

use url::Url;

/// Extract the domain part of an email address, cleaned of trailing
/// punctuation artifacts that show up in pasted text.
pub fn email_domain(email: &str) -> Option<String> {
    let at_pos = email.rfind('@')?;
    if at_pos == 0 {
        return None;
    }
    let domain = email[at_pos + 1..]
        .split_whitespace()
        .next()?
        .trim_matches(|c: char| matches!(c, '>' | ',' | ';' | '.' | ')'))
        .trim();

    if domain.contains('.')
        && !domain.is_empty()
        && domain.len() < 255
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        Some(domain.to_lowercase())
    } else {
        None
    }
}

/// Extract the local part (everything before the last '@').
pub fn email_local_part(email: &str) -> Option<&str> {
    let at_pos = email.rfind('@')?;
    if at_pos == 0 {
        None
    } else {
        Some(&email[..at_pos])
    }
}

/// Reduce a host to its registrable domain for WHOIS queries,
/// e.g. "email.nationalgeographic.com" -> "nationalgeographic.com".
pub fn registrable_domain(domain: &str) -> String {
    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return domain.to_string();
    }

    let root = format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1]);

    // Common two-part TLDs like .co.uk need three labels.
    if parts.len() >= 3 {
        const TWO_PART_TLDS: [&str; 17] = [
            "co.uk", "com.au", "co.jp", "co.kr", "com.br", "co.za", "com.mx", "co.in", "com.sg",
            "co.nz", "com.ar", "co.il", "org.uk", "net.au", "gov.uk", "ac.uk", "edu.au",
        ];
        if TWO_PART_TLDS.contains(&root.as_str()) {
            return format!(
                "{}.{}.{}",
                parts[parts.len() - 3],
                parts[parts.len() - 2],
                parts[parts.len() - 1]
            );
        }
    }

    root
}

/// Host portion of a URL, lowercased.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(|h| h.to_lowercase())
}

/// Known URL-shortener hosts. Shorteners hide the real destination, which is
/// a mild risk indicator on its own.
pub fn is_shortener_host(host: &str) -> bool {
    const SHORTENERS: [&str; 14] = [
        "bit.ly",
        "tinyurl.com",
        "t.co",
        "goo.gl",
        "ow.ly",
        "short.link",
        "is.gd",
        "v.gd",
        "tiny.cc",
        "rb.gy",
        "cutt.ly",
        "shorturl.at",
        "1url.com",
        "u.to",
    ];
    SHORTENERS
        .iter()
        .any(|&s| host == s || host.ends_with(&format!(".{s}")))
}

/// Disposable / throwaway mail providers seen in scam traffic.
pub fn is_disposable_domain(domain: &str) -> bool {
    const DISPOSABLE: [&str; 12] = [
        "mailinator.com",
        "guerrillamail.com",
        "10minutemail.com",
        "tempmail.com",
        "temp-mail.org",
        "throwawaymail.com",
        "yopmail.com",
        "getnada.com",
        "trashmail.com",
        "sharklasers.com",
        "dispostable.com",
        "maildrop.cc",
    ];
    DISPOSABLE
        .iter()
        .any(|&s| domain == s || domain.ends_with(&format!(".{s}")))
}
