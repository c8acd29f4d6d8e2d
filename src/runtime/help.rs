//! Help texts

use super::types::{MemberKind, TypeTag};
use super::value::Value;

/// Banner printed when the interactive shell starts
pub const HELP_START: &str = "
This is an interactive interface to Deker.
You have an initiated 'client' instance to create and get collections,
'collections' variable with a list of collection names
and 'collection' variable that can be set by 'use' method.
If you need more information, call help()
Example:
    use(\"test\")
    collection.metadata
---
Tab - completion menu
Ctrl-D - exit
";

/// Overview printed by `help()`
pub const HELP_TEXT: &str = "
Preset variables:
- client: Client (registry of collections) instance, connected to the uri-database
- collections: list of Client collections names
- collection: global default collection variable, set by use(\"coll_name\") method

Classes:
- Client: registry of collections
- Collection: collection of arrays

Methods:
- use(\"name\"): gets collection from client and saves it to 'collection' variable
- get_global_coll_variable(): returns 'collection' global variable

Call help(class or function) to read more
";

/// Documentation of a single value: its doc string and public members
pub fn describe(value: &Value) -> String {
    let tag = value.tag();
    let mut out = String::new();

    match value {
        Value::Builtin(builtin) => {
            out.push_str(&signature(builtin.name(), builtin.params()));
            out.push_str("\n    ");
            out.push_str(builtin.doc());
            out.push('\n');
            return out;
        }
        Value::Method { receiver, name } => {
            if let Some(member) = receiver.tag().member(name) {
                out.push_str(&signature(name, member.params));
                out.push_str("\n    ");
                out.push_str(member.doc);
                out.push('\n');
            }
            return out;
        }
        _ => {}
    }

    let (title, display_name) = match value {
        Value::Class(kind) => (format!("class {}", kind.name()), kind.name()),
        _ => (format!("{} object", tag.name()), tag.name()),
    };
    let doc = class_doc(tag);
    out.push_str(&title);
    out.push('\n');
    if !doc.is_empty() {
        out.push_str("    ");
        out.push_str(doc);
        out.push('\n');
    }

    if let Some(params) = tag.call_params() {
        out.push('\n');
        out.push_str(&signature(display_name, params));
        out.push('\n');
    }

    // Members of the instance type for classes, of the value's own type otherwise
    let member_tag = match tag {
        TypeTag::ClientClass => TypeTag::Client,
        TypeTag::CollectionClass => TypeTag::Collection,
        other => other,
    };
    let public: Vec<_> = member_tag
        .members()
        .iter()
        .filter(|m| !m.name.starts_with('_'))
        .collect();
    if !public.is_empty() {
        out.push_str("\nMembers:\n");
        for member in public {
            let name = match member.kind {
                MemberKind::Method => signature(member.name, member.params),
                MemberKind::Property => member.name.to_string(),
            };
            out.push_str(&format!("- {name}: {}\n", member.doc));
        }
    }

    out
}

fn class_doc(tag: TypeTag) -> &'static str {
    match tag {
        TypeTag::Client | TypeTag::ClientClass => super::types::CLIENT_DOC,
        TypeTag::Collection | TypeTag::CollectionClass => super::types::COLLECTION_DOC,
        _ => "",
    }
}

fn signature(name: &str, params: &[&str]) -> String {
    format!("{name}({})", params.join(", "))
}
