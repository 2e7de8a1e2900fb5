//! `%name%` parameter references, as build servers write them in feature settings.

pub const MAX_DEPTH: usize = 16;
/// Expansion stops once a value would grow past this many bytes.
pub const MAX_RESOLVED_LEN: usize = 64 * 1024;

static REFERENCE: once_cell::sync::Lazy<regex::Regex> =
    once_cell::sync::Lazy::new(|| regex::Regex::new(r"%([^%\s]*)%").unwrap());

/// Each referenced name is expanded at most once per resolver; later references reuse the
/// result.
pub struct ValueResolver<'a> {
    params: &'a crate::host::BuildParameters,
    resolved: std::cell::RefCell<std::collections::HashMap<String, String>>,
    visiting: std::cell::RefCell<std::collections::HashSet<String>>,
}

impl<'a> ValueResolver<'a> {
    pub fn new(params: &'a crate::host::BuildParameters) -> Self {
        Self {
            params,
            resolved: Default::default(),
            visiting: Default::default(),
        }
    }

    /// Expands every reference in `value`. `%%` is a literal `%`. Unknown names, cyclic
    /// references and references nested deeper than [`MAX_DEPTH`] are kept as written.
    pub fn resolve(&self, value: &str) -> String {
        self.expand(value, 0)
    }

    pub fn resolve_all(
        &self,
        values: &std::collections::BTreeMap<String, String>,
    ) -> std::collections::BTreeMap<String, String> {
        values
            .iter()
            .map(|(k, v)| (k.clone(), self.resolve(v)))
            .collect()
    }

    fn expand(&self, value: &str, depth: usize) -> String {
        let mut out = String::with_capacity(value.len());
        let mut last = 0;
        for caps in REFERENCE.captures_iter(value) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&value[last..whole.start()]);
            let replacement = self.reference(&caps[1], whole.as_str(), depth);
            if out.len() + replacement.len() > MAX_RESOLVED_LEN {
                tracing::warn!(
                    message = "parameter value too long after expansion, rest left unresolved",
                    limit = MAX_RESOLVED_LEN,
                );
                out.push_str(&value[whole.start()..]);
                return out;
            }
            out.push_str(&replacement);
            last = whole.end();
        }
        out.push_str(&value[last..]);
        out
    }

    fn reference(&self, name: &str, raw: &str, depth: usize) -> String {
        if name.is_empty() {
            return "%".to_string();
        }
        let Some(value) = self.params.get(name) else {
            return raw.to_string();
        };
        if let Some(done) = self.resolved.borrow().get(name).cloned() {
            return done;
        }
        if self.visiting.borrow().contains(name) {
            tracing::warn!(
                message = "cyclic parameter reference left unresolved",
                name = %name,
            );
            return raw.to_string();
        }
        if depth >= MAX_DEPTH {
            tracing::warn!(
                message = "parameter reference nested too deeply, left unresolved",
                name = %name,
            );
            return raw.to_string();
        }

        self.visiting.borrow_mut().insert(name.to_string());
        let expanded = self.expand(value, depth + 1);
        self.visiting.borrow_mut().remove(name);
        self.resolved
            .borrow_mut()
            .insert(name.to_string(), expanded.clone());
        expanded
    }
}
