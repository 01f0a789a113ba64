use crate::errors::SendError;
use lettre::message::Mailbox;

/// An address split into the `{email, name}` shape Mandrill expects.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Recipient {
    pub email: String,
    pub name: String,
}

impl Recipient {
    /// Parse an RFC 2822 address such as `Jane Doe <jane@example.com>`.
    ///
    /// A bare address yields an empty name, unless it carries a comment
    /// (`jane@example.com (Jane Doe)`), which then becomes the name.
    pub fn parse(address: &str) -> Result<Self, SendError> {
        let (stripped, comments) = strip_comments(address.trim());
        let recipient = match stripped.parse::<Mailbox>() {
            Ok(mailbox) => Self {
                email: mailbox.email.to_string(),
                name: mailbox.name.unwrap_or_default(),
            },
            Err(source) => split_loosely(&stripped).ok_or_else(|| SendError::InvalidAddress {
                address: address.to_string(),
                source,
            })?,
        };
        if recipient.name.is_empty() && !comments.is_empty() {
            return Ok(Self {
                name: comments.join(" "),
                ..recipient
            });
        }
        Ok(recipient)
    }
}

/// Remove `(comments)` outside quoted strings, returning them separately.
///
/// Comments nest and honour `\` escapes.
fn strip_comments(address: &str) -> (String, Vec<String>) {
    let mut stripped = String::with_capacity(address.len());
    let mut comments = Vec::new();
    let mut comment = String::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut escaped = false;

    for c in address.chars() {
        if escaped {
            escaped = false;
            if depth > 0 {
                comment.push(c);
            } else {
                stripped.push(c);
            }
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                if depth == 0 {
                    stripped.push(c);
                }
            }
            '"' if depth == 0 => {
                quoted = !quoted;
                stripped.push(c);
            }
            '(' if !quoted => {
                if depth > 0 {
                    comment.push(c);
                }
                depth += 1;
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let text = comment.trim().to_string();
                    if !text.is_empty() {
                        comments.push(text);
                    }
                    comment.clear();
                } else {
                    comment.push(c);
                }
            }
            _ if depth > 0 => comment.push(c),
            _ => stripped.push(c),
        }
    }

    if comments.is_empty() {
        return (stripped, comments);
    }
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    (collapsed, comments)
}

/// Split `name <local@domain>` or `local@domain` without validating the
/// domain, for forms the mailbox parser refuses such as `user@[127.0.0.1]`.
fn split_loosely(address: &str) -> Option<Recipient> {
    let (display, email) = match address.rfind('<') {
        Some(start) => {
            let email = address[start + 1..].trim_end().strip_suffix('>')?;
            (address[..start].trim(), email.trim())
        }
        None => ("", address),
    };
    let (local, domain) = email.rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() || email.contains(char::is_whitespace) {
        return None;
    }
    let name = display
        .strip_prefix('"')
        .and_then(|d| d.strip_suffix('"'))
        .unwrap_or(display);
    Some(Recipient {
        email: email.to_string(),
        name: name.to_string(),
    })
}
