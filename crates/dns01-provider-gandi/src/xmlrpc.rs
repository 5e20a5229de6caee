// # XML-RPC Codec
//
// Minimal XML-RPC encoding and decoding for the legacy Gandi endpoint.
// Only the types the zone API actually exchanges are modeled: ints,
// strings, booleans, structs, and arrays.
//
// Requests are small enough to assemble as escaped strings; responses are
// parsed with a quick-xml event walk. Fault responses decode into
// [`Fault`] rather than an error so the caller can attach the step that
// was running.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use thiserror::Error;

/// XML-RPC value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Str(String),
    Bool(bool),
    /// BTreeMap keeps member order deterministic in built requests
    Struct(BTreeMap<String, Value>),
    Array(Vec<Value>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Struct member lookup; `None` for non-structs and missing keys
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.get(key),
            _ => None,
        }
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<value>");
        match self {
            Value::Int(v) => {
                out.push_str("<int>");
                out.push_str(&v.to_string());
                out.push_str("</int>");
            }
            Value::Str(s) => {
                out.push_str("<string>");
                out.push_str(&escape(s.as_str()));
                out.push_str("</string>");
            }
            Value::Bool(b) => {
                out.push_str("<boolean>");
                out.push_str(if *b { "1" } else { "0" });
                out.push_str("</boolean>");
            }
            Value::Struct(members) => {
                out.push_str("<struct>");
                for (name, value) in members {
                    out.push_str("<member><name>");
                    out.push_str(&escape(name.as_str()));
                    out.push_str("</name>");
                    value.write_xml(out);
                    out.push_str("</member>");
                }
                out.push_str("</struct>");
            }
            Value::Array(items) => {
                out.push_str("<array><data>");
                for item in items {
                    item.write_xml(out);
                }
                out.push_str("</data></array>");
            }
        }
        out.push_str("</value>");
    }
}

/// A `<fault>` response from the endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub code: i64,
    pub message: String,
}

/// Decoded `<methodResponse>`
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Value(Value),
    Fault(Fault),
}

/// Codec-level failures (transport and API-level errors live elsewhere)
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed XML-RPC response: {0}")]
    Malformed(String),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Serialize a `<methodCall>` document
pub fn method_call(method: &str, params: &[Value]) -> String {
    let mut out = String::with_capacity(256);
    out.push_str("<?xml version=\"1.0\"?>");
    out.push_str("<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        param.write_xml(&mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Parse a `<methodResponse>` document into its single return value or fault
pub fn parse_response(xml: &str) -> Result<Response, CodecError> {
    let mut reader = Reader::from_str(xml);

    let mut in_fault = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"fault" => in_fault = true,
                b"value" => {
                    let value = parse_value(&mut reader)?;
                    if in_fault {
                        let code = value.get("faultCode").and_then(Value::as_i64).unwrap_or(0);
                        let message = value
                            .get("faultString")
                            .and_then(Value::as_str)
                            .unwrap_or("unknown fault")
                            .to_string();
                        return Ok(Response::Fault(Fault { code, message }));
                    }
                    return Ok(Response::Value(value));
                }
                _ => {}
            },
            Event::Eof => {
                return Err(CodecError::Malformed(
                    "response contains no value".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Parse one value; the opening `<value>` tag has already been consumed
fn parse_value(reader: &mut Reader<&[u8]>) -> Result<Value, CodecError> {
    let mut value: Option<Value> = None;
    let mut text: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let tag = e.name().as_ref().to_vec();
                match tag.as_slice() {
                    b"int" | b"i4" | b"i8" => {
                        let raw = read_element_text(reader, &tag)?;
                        let parsed = raw.trim().parse::<i64>().map_err(|_| {
                            CodecError::Malformed(format!("invalid integer: {raw:?}"))
                        })?;
                        value = Some(Value::Int(parsed));
                    }
                    b"string" => {
                        value = Some(Value::Str(read_element_text(reader, &tag)?));
                    }
                    b"boolean" => {
                        let raw = read_element_text(reader, &tag)?;
                        value = Some(Value::Bool(raw.trim() == "1"));
                    }
                    b"struct" => value = Some(parse_struct(reader)?),
                    b"array" => value = Some(parse_array(reader)?),
                    other => {
                        return Err(CodecError::Malformed(format!(
                            "unsupported value type <{}>",
                            String::from_utf8_lossy(other)
                        )));
                    }
                }
            }
            // XML-RPC treats an untagged value as a string.
            Event::Text(t) => text = Some(t.unescape()?.into_owned()),
            Event::Empty(e) if e.name().as_ref() == b"string" => {
                value = Some(Value::Str(String::new()));
            }
            Event::End(e) if e.name().as_ref() == b"value" => {
                return Ok(value
                    .or(text.map(Value::Str))
                    .unwrap_or(Value::Str(String::new())));
            }
            Event::Eof => {
                return Err(CodecError::Malformed(
                    "unexpected end of document inside <value>".to_string(),
                ));
            }
            _ => {}
        }
    }
}

fn parse_struct(reader: &mut Reader<&[u8]>) -> Result<Value, CodecError> {
    let mut members = BTreeMap::new();
    let mut name: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let tag = e.name().as_ref().to_vec();
                match tag.as_slice() {
                    b"member" => {}
                    b"name" => name = Some(read_element_text(reader, &tag)?),
                    b"value" => {
                        let value = parse_value(reader)?;
                        let key = name.take().ok_or_else(|| {
                            CodecError::Malformed("struct member value before name".to_string())
                        })?;
                        members.insert(key, value);
                    }
                    other => {
                        return Err(CodecError::Malformed(format!(
                            "unexpected <{}> inside <struct>",
                            String::from_utf8_lossy(other)
                        )));
                    }
                }
            }
            Event::End(e) if e.name().as_ref() == b"struct" => {
                return Ok(Value::Struct(members));
            }
            Event::Eof => {
                return Err(CodecError::Malformed(
                    "unexpected end of document inside <struct>".to_string(),
                ));
            }
            _ => {}
        }
    }
}

fn parse_array(reader: &mut Reader<&[u8]>) -> Result<Value, CodecError> {
    let mut items = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"data" => {}
                b"value" => items.push(parse_value(reader)?),
                other => {
                    return Err(CodecError::Malformed(format!(
                        "unexpected <{}> inside <array>",
                        String::from_utf8_lossy(other)
                    )));
                }
            },
            Event::End(e) if e.name().as_ref() == b"array" => {
                return Ok(Value::Array(items));
            }
            Event::Eof => {
                return Err(CodecError::Malformed(
                    "unexpected end of document inside <array>".to_string(),
                ));
            }
            _ => {}
        }
    }
}

/// Collect the text content of the element opened as `tag`
fn read_element_text(reader: &mut Reader<&[u8]>, tag: &[u8]) -> Result<String, CodecError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::End(e) if e.name().as_ref() == tag => return Ok(text),
            Event::Eof => {
                return Err(CodecError::Malformed(format!(
                    "unexpected end of document inside <{}>",
                    String::from_utf8_lossy(tag)
                )));
            }
            _ => {}
        }
    }
}
