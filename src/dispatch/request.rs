//! Per-request context: parsed path, typed query and formatting options.

use super::route::{self, Route};
use axum::extract::Query as QueryExtractor;
use axum::http::Uri;
use log::warn;
use serde_json::{Map, Value};

/// A query-string token after numeric conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Int(i64),
    Decimal(f64),
    Text(String),
}

impl QueryValue {
    /// All-digit tokens become integers, `digits.digits` decimals,
    /// anything else stays text.
    pub fn convert(token: &str) -> Self {
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(i) = token.parse() {
                return QueryValue::Int(i);
            }
        }
        if let Some((whole, frac)) = token.split_once('.')
            && !(whole.is_empty() && frac.is_empty())
            && whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit())
            && let Ok(d) = token.parse()
        {
            return QueryValue::Decimal(d);
        }
        QueryValue::Text(token.to_string())
    }

    pub fn to_value(&self) -> Value {
        match self {
            QueryValue::Int(i) => Value::from(*i),
            QueryValue::Decimal(d) => Value::from(*d),
            QueryValue::Text(s) => Value::String(s.clone()),
        }
    }

}

/// One query value: the decoded token as sent, plus its conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParam {
    pub token: String,
    pub value: QueryValue,
}

impl QueryParam {
    pub fn new(token: String) -> Self {
        let value = QueryValue::convert(&token);
        Self { token, value }
    }
}

/// Decoded query parameters, keyed in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    params: Vec<(String, Vec<QueryParam>)>,
    raw: String,
}

impl Query {
    pub fn from_uri(uri: &Uri) -> Self {
        let raw = uri.query().unwrap_or_default().to_string();
        let pairs = match QueryExtractor::<Vec<(String, String)>>::try_from_uri(uri) {
            Ok(QueryExtractor(pairs)) => pairs,
            Err(e) => {
                warn!("Ignoring undecodable query string '{}': {}", raw, e);
                Vec::new()
            }
        };

        let mut params: Vec<(String, Vec<QueryParam>)> = Vec::new();
        // Blank values carry no information and are dropped.
        for (key, value) in pairs.into_iter().filter(|(_, v)| !v.is_empty()) {
            let param = QueryParam::new(value);
            match params.iter_mut().find(|(k, _)| *k == key) {
                Some((_, values)) => values.push(param),
                None => params.push((key, vec![param])),
            }
        }
        Self { params, raw }
    }

    /// The undecoded query string, without the leading `?`.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn get(&self, key: &str) -> Option<&[QueryParam]> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// The last value given for `key`.
    pub fn last(&self, key: &str) -> Option<&QueryParam> {
        self.get(key).and_then(|v| v.last())
    }

    /// Structured form for templates: one value per key when it occurred
    /// once, a list of values otherwise.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (key, values) in &self.params {
            let value = match values.as_slice() {
                [single] => single.value.to_value(),
                many => Value::Array(many.iter().map(|p| p.value.to_value()).collect()),
            };
            map.insert(key.clone(), value);
        }
        Value::Object(map)
    }
}

/// Formatting knobs shared by the text and HTML templates.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    pub indent_incr: i64,
    pub bullet_char: char,
    pub prevent_breaks: bool,
}

impl FormatOptions {
    /// Applies same-named query parameters on top of `self`. Values that do
    /// not convert are ignored with a warning.
    pub fn overridden_by(&self, query: &Query) -> Self {
        let mut options = self.clone();

        if let Some(p) = query.last("indent_incr") {
            match p.value {
                QueryValue::Int(i) => options.indent_incr = i,
                _ => warn!("indent_incr expects an integer, got '{}'", p.token),
            }
        }

        // Read from the token so `07` stays `0`, not the `7` of its integer.
        if let Some(p) = query.last("bullet_char") {
            match p.token.chars().next() {
                Some(c) => options.bullet_char = c,
                None => warn!("bullet_char is empty"),
            }
        }

        if let Some(p) = query.last("prevent_breaks") {
            match parse_flag(&p.token) {
                Some(flag) => options.prevent_breaks = flag,
                None => warn!("prevent_breaks expects a boolean, got '{}'", p.token),
            }
        }

        options
    }

    fn insert_into(&self, vars: &mut Map<String, Value>) {
        vars.insert("indent_incr".into(), Value::from(self.indent_incr));
        vars.insert(
            "bullet_char".into(),
            Value::String(self.bullet_char.to_string()),
        );
        vars.insert("prevent_breaks".into(), Value::Bool(self.prevent_breaks));
    }
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "y" | "t" => Some(true),
        "0" | "false" | "no" | "off" | "n" | "f" => Some(false),
        _ => None,
    }
}

/// Everything one request needs. Built at request start, dropped with the
/// response.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request path after aliasing `/` to the default document.
    pub path: String,
    pub query: Query,
    pub route: Route,
    pub format: FormatOptions,
    /// Fresh per request; templates append it to asset URLs.
    pub cache_buster: String,
}

impl RequestContext {
    pub fn parse(uri: &Uri, default_document: &str, defaults: &FormatOptions) -> Self {
        let path = match uri.path() {
            "" | "/" => format!("/{}", default_document.trim_start_matches('/')),
            other => other.to_string(),
        };
        let query = Query::from_uri(uri);
        let route = route::classify(&path);
        let format = defaults.overridden_by(&query);

        Self {
            path,
            query,
            route,
            format,
            cache_buster: cache_buster(),
        }
    }

    /// Variables passed to the template alongside the document.
    pub fn template_vars(&self) -> Map<String, Value> {
        let file_name = self.path.rsplit('/').next().unwrap_or_default();
        let mut vars = Map::new();
        vars.insert("docname".into(), Value::String(route::stem_of(file_name)));
        vars.insert("random".into(), Value::String(self.cache_buster.clone()));
        vars.insert("url_query".into(), self.query.to_value());
        vars.insert(
            "url_query_str".into(),
            Value::String(self.query.raw().to_string()),
        );
        self.format.insert_into(&mut vars);
        vars
    }
}

/// A random decimal string, e.g. `8342209917305561234`.
pub fn cache_buster() -> String {
    rand::random::<u64>().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    fn defaults() -> FormatOptions {
        FormatOptions {
            indent_incr: 2,
            bullet_char: '-',
            prevent_breaks: false,
        }
    }

    #[test]
    fn converts_numeric_tokens() {
        assert_eq!(QueryValue::convert("42"), QueryValue::Int(42));
        assert_eq!(QueryValue::convert("1.5"), QueryValue::Decimal(1.5));
        assert_eq!(QueryValue::convert(".5"), QueryValue::Decimal(0.5));
        assert_eq!(QueryValue::convert("-3"), QueryValue::Text("-3".into()));
        assert_eq!(QueryValue::convert("1.2.3"), QueryValue::Text("1.2.3".into()));
        assert_eq!(QueryValue::convert("."), QueryValue::Text(".".into()));
        assert_eq!(QueryValue::convert("abc"), QueryValue::Text("abc".into()));
    }

    #[test]
    fn single_and_repeated_keys() {
        let q = Query::from_uri(&uri("/r.html?a=1&b=x&a=2.5&c=&d=hello%20world"));
        assert_eq!(
            q.to_value(),
            json!({"a": [1, 2.5], "b": "x", "d": "hello world"})
        );
        assert_eq!(q.raw(), "a=1&b=x&a=2.5&c=&d=hello%20world");
        assert_eq!(q.last("a").map(|p| &p.value), Some(&QueryValue::Decimal(2.5)));
        assert_eq!(q.get("a").map(|v| v.len()), Some(2));
        assert!(q.get("c").is_none());
    }

    #[test]
    fn root_aliases_default_document() {
        let ctx = RequestContext::parse(&uri("/"), "resume.html", &defaults());
        assert_eq!(ctx.path, "/resume.html");
        assert!(matches!(ctx.route, Route::Rendered { .. }));
        assert_eq!(ctx.template_vars()["docname"], json!("resume"));
    }

    #[test]
    fn format_overrides_from_query() {
        let q = Query::from_uri(&uri("/x?indent_incr=6&bullet_char=*&prevent_breaks=yes"));
        let opts = defaults().overridden_by(&q);
        assert_eq!(
            opts,
            FormatOptions {
                indent_incr: 6,
                bullet_char: '*',
                prevent_breaks: true
            }
        );
    }

    #[test]
    fn overrides_read_the_token_as_sent() {
        let q = Query::from_uri(&uri("/x?bullet_char=07&prevent_breaks=1"));
        let opts = defaults().overridden_by(&q);
        assert_eq!(opts.bullet_char, '0');
        assert!(opts.prevent_breaks);
        assert_eq!(q.last("bullet_char").map(|p| p.token.as_str()), Some("07"));
        assert_eq!(q.to_value(), json!({"bullet_char": 7, "prevent_breaks": 1}));
    }

    #[test]
    fn unconvertible_overrides_keep_defaults() {
        let q = Query::from_uri(&uri("/x?indent_incr=wide&prevent_breaks=maybe"));
        assert_eq!(defaults().overridden_by(&q), defaults());
    }

    #[test]
    fn template_vars_carry_query_and_format() {
        let ctx = RequestContext::parse(&uri("/resume.txt?bullet_char=%E2%80%A2&x=1"), "resume.html", &defaults());
        let vars = ctx.template_vars();
        assert_eq!(vars["bullet_char"], json!("\u{2022}"));
        assert_eq!(vars["indent_incr"], json!(2));
        assert_eq!(vars["prevent_breaks"], json!(false));
        assert_eq!(vars["url_query"], json!({"bullet_char": "\u{2022}", "x": 1}));
        assert_eq!(vars["url_query_str"], json!("bullet_char=%E2%80%A2&x=1"));
        assert!(vars["random"].as_str().unwrap().bytes().all(|b| b.is_ascii_digit()));
    }
}
