use serde_json::Value;

/// One row of cells as returned by `values.get`.
pub type Row = Vec<Value>;

/// Renders values the way Python's `repr` prints them, so a row comes out as
/// `['a', 'b']`.
pub trait ToPyLiteral {
    fn to_py_literal(&self) -> String;
}

impl ToPyLiteral for str {
    fn to_py_literal(&self) -> String {
        let quote = if self.contains('\'') && !self.contains('"') {
            '"'
        } else {
            '\''
        };

        let mut literal = String::with_capacity(self.len() + 2);
        literal.push(quote);
        for c in self.chars() {
            match c {
                '\\' => literal.push_str("\\\\"),
                '\n' => literal.push_str("\\n"),
                '\r' => literal.push_str("\\r"),
                '\t' => literal.push_str("\\t"),
                c if c == quote => {
                    literal.push('\\');
                    literal.push(c);
                }
                '\'' | '"' => literal.push(c),
                c if !is_printable(c) => literal.push_str(&unicode_escape(c)),
                c => literal.push(c),
            }
        }
        literal.push(quote);
        literal
    }
}

/// Python treats Cc, Cf, Cs, Co, Cn, Zl, Zp and every Zs other than the
/// plain space as non-printable. `str::escape_debug` keeps exactly those
/// escaped once grapheme-extend handling is out of the way, which only
/// applies to the first char.
fn is_printable(c: char) -> bool {
    let mut probe = String::from(' ');
    probe.push(c);
    probe.escape_debug().skip(1).eq(std::iter::once(c))
}

fn unicode_escape(c: char) -> String {
    match c as u32 {
        code @ 0..=0xff => format!("\\x{:02x}", code),
        code @ 0x100..=0xffff => format!("\\u{:04x}", code),
        code => format!("\\U{:08x}", code),
    }
}

impl ToPyLiteral for Value {
    fn to_py_literal(&self) -> String {
        match self {
            Value::Null => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Number(number) => number.to_string(),
            Value::String(s) => s.to_py_literal(),
            Value::Array(items) => items.to_py_literal(),
            Value::Object(map) => {
                let entries = map
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key.to_py_literal(), value.to_py_literal()))
                    .collect::<Vec<_>>();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }
}

impl ToPyLiteral for [Value] {
    fn to_py_literal(&self) -> String {
        let items = self
            .iter()
            .map(ToPyLiteral::to_py_literal)
            .collect::<Vec<_>>();
        format!("[{}]", items.join(", "))
    }
}
