pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());

    for token in raw
        .split(|ch: char| ch.is_whitespace() || is_non_breaking_space(ch))
        .filter(|token| !token.is_empty())
    {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }

    out
}

pub fn normalize_fragments<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let joined = fragments.into_iter().collect::<Vec<&str>>().join(" ");
    normalize(&joined)
}

fn is_non_breaking_space(ch: char) -> bool {
    matches!(ch, '\u{00A0}' | '\u{202F}' | '\u{2007}')
}
