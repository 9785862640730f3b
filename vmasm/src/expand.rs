use crate::error::AsmError;
use indexmap::IndexMap;

/// A `.macro NAME N` .. `.endm` template. Body lines are stored verbatim;
/// `$1`..`$N` are placeholders for the invocation arguments.
#[derive(Debug, Clone)]
struct Macro {
    arity: usize,
    body: Vec<String>,
}

/// Pre-pass over the raw source text: collect macro definitions and splice
/// each invocation's expanded body in place of the invocation line. The
/// substitution is purely textual; expanded lines are not re-scanned, so
/// macros do not nest or recurse.
pub fn expand(src: &str) -> Result<String, AsmError> {
    let mut macros: IndexMap<String, Macro> = IndexMap::new();
    let mut current: Option<(String, Macro)> = None;
    let mut out = String::new();

    for (idx, raw) in src.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw.trim();
        let first = trimmed.split_whitespace().next().unwrap_or("");

        if current.is_some() {
            // directives match case-insensitively, like everywhere else
            match first.to_ascii_lowercase().as_str() {
                ".endm" => {
                    if let Some((name, def)) = current.take() {
                        // a redefinition shadows the old body for the lines below
                        macros.insert(name, def);
                    }
                }
                ".macro" => return Err(AsmError::NestedMacro(line_no)),
                _ => {
                    if let Some((_, def)) = current.as_mut() {
                        def.body.push(raw.to_string());
                    }
                }
            }
            continue;
        }

        if first.to_ascii_lowercase() == ".macro" {
            let mut words = trimmed.split_whitespace().skip(1);
            let name = words
                .next()
                .ok_or(AsmError::MacroMissingName(line_no))?
                .to_string();
            let arity = match words.next() {
                Some(w) => w
                    .parse::<usize>()
                    .map_err(|_| AsmError::MacroBadArity(w.to_string(), line_no))?,
                None => 0,
            };
            current = Some((
                name,
                Macro {
                    arity,
                    body: Vec::new(),
                },
            ));
            continue;
        }

        // invocation: the first whitespace-delimited word names the macro
        if let Some(mac) = macros.get(first) {
            let rest = trimmed[first.len()..].trim();
            // the lexer never sees these lines, so strip comments here
            let rest = rest.split(';').next().unwrap_or("").trim();
            let args = split_args(rest);
            if args.len() != mac.arity {
                return Err(AsmError::MacroArity(
                    first.to_string(),
                    mac.arity,
                    args.len(),
                    line_no,
                ));
            }
            for body in &mac.body {
                out.push_str(&substitute(body, &args));
                out.push('\n');
            }
            continue;
        }

        out.push_str(raw);
        out.push('\n');
    }

    if let Some((name, _)) = current {
        return Err(AsmError::UnterminatedMacro(name));
    }
    Ok(out)
}

/// Split on top-level commas; commas inside `[...]` do not split.
fn split_args(rest: &str) -> Vec<String> {
    if rest.is_empty() {
        return Vec::new();
    }
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut cur = String::new();
    for ch in rest.chars() {
        match ch {
            '[' => {
                depth += 1;
                cur.push(ch);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                cur.push(ch);
            }
            ',' if depth == 0 => args.push(std::mem::take(&mut cur)),
            _ => cur.push(ch),
        }
    }
    args.push(cur);
    args.into_iter().map(|a| a.trim().to_string()).collect()
}

/// Replace each `$k` with the k-th argument. The cursor advances past the
/// substituted text, so arguments containing `$` are never re-replaced.
fn substitute(body: &str, args: &[String]) -> String {
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '$' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            if j > i + 1 {
                let num: String = chars[i + 1..j].iter().collect();
                if let Ok(k) = num.parse::<usize>() {
                    if k >= 1 && k <= args.len() {
                        out.push_str(&args[k - 1]);
                        i = j;
                        continue;
                    }
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}
