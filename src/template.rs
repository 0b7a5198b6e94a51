//! `${name}` placeholder substitution.
//!
//! Lookups distinguish a missing key from a key holding an empty or falsy
//! value: only a missing key leaves the placeholder in place.

use std::{
    borrow::Cow,
    collections::{BTreeMap, HashMap},
    fmt::Display,
    sync::LazyLock,
};

use regex::{Captures, Regex};
use serde_json::{Map, Value};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid")
});

/// Flat key/value source for [`hydrate`].
pub trait TemplateData {
    /// Returns the substitution for `key`, or `None` when the key is absent.
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>>;
}

/// Replaces every `${name}` in `template` whose `name` is present in `data`.
///
/// Placeholders without a matching key are kept verbatim. Substituted values
/// are not rescanned.
///
/// ```
/// use serde_json::json;
///
/// let html = fido::hydrate("<p>Hello ${name}! ${missing}</p>", &json!({"name": "World"}));
/// assert_eq!(html, "<p>Hello World! ${missing}</p>");
/// ```
pub fn hydrate<D: TemplateData + ?Sized>(template: &str, data: &D) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match data.lookup(&caps[1]) {
            Some(value) => value.into_owned(),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

/// Coerces a JSON value to text the way a browser's `String(value)` does.
///
/// Integers outside the `f64`-exact range keep all their digits.
pub fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        Value::Null => Cow::Borrowed("null"),
        Value::Bool(flag) => Cow::Borrowed(if *flag { "true" } else { "false" }),
        Value::Number(number) => Cow::Owned(match number.as_f64() {
            Some(float) if number.is_f64() => js_number(float),
            _ => number.to_string(),
        }),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| match item {
                    Value::Null => Cow::Borrowed(""),
                    other => stringify(other),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Borrowed("[object Object]"),
    }
}

/// Formats a finite float with JavaScript's `Number::toString` rules:
/// positional notation for exponents in `[-7, 21)`, otherwise `d.ddde±x`.
fn js_number(float: f64) -> String {
    if float == 0.0 {
        return "0".to_owned();
    }
    let sci = format!("{:e}", float.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent.parse::<i32>().unwrap_or(0) + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat(-n as usize))
    } else {
        let exp = n - 1;
        let sign = if exp >= 0 { "+" } else { "-" };
        match digits.split_at(1) {
            (first, "") => format!("{first}e{sign}{}", exp.abs()),
            (first, rest) => format!("{first}.{rest}e{sign}{}", exp.abs()),
        }
    };

    if float < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

impl TemplateData for Value {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        match self {
            Value::Object(map) => map.lookup(key),
            Value::Array(items) if key == "length" => Some(Cow::Owned(items.len().to_string())),
            Value::Array(items) => key
                .parse::<usize>()
                .ok()
                .filter(|_| !key.starts_with('0') || key == "0")
                .and_then(|index| items.get(index))
                .map(stringify),
            _ => None,
        }
    }
}

impl TemplateData for Map<String, Value> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(stringify)
    }
}

impl<V: Display> TemplateData for HashMap<String, V> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Owned(value.to_string()))
    }
}

impl<V: Display> TemplateData for BTreeMap<String, V> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|value| Cow::Owned(value.to_string()))
    }
}

impl<T: TemplateData + ?Sized> TemplateData for &T {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        (**self).lookup(key)
    }
}
