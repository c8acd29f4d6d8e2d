//! Type registry
//!
//! Every value has a [`TypeTag`]. The registry describes what each type
//! exposes (attributes, methods, their parameters and result types) and is
//! the single source used both by the interpreter for attribute lookup and by
//! the completion analyzer for member suggestions.

/// Module of names bound by the user
pub const MAIN_MODULE: &str = "__main__";
/// Module of the shell's own helpers
pub const SHELL_MODULE: &str = "deker_shell";
/// Module of the storage client classes
pub const CLIENT_MODULE: &str = "deker";
/// Module of language builtins and magic members
pub const BUILTINS_MODULE: &str = "builtins";

/// Constructor keywords of `Client`
pub const CLIENT_PARAMS: &[&str] = &[
    "uri",
    "workers",
    "write_lock_timeout",
    "write_lock_check_interval",
    "loglevel",
    "memory_limit",
];

/// Type of a runtime value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    NoneType,
    Bool,
    Int,
    Float,
    Str,
    List,
    Json,
    Client,
    Collection,
    ClientClass,
    CollectionClass,
    Builtin(Builtin),
    Method,
}

/// Shell-provided functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Use,
    GetGlobalCollVariable,
    Help,
    Print,
    Len,
    Exit,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    Property,
}

/// One attribute of a type
#[derive(Debug, Clone, Copy)]
pub struct Member {
    pub name: &'static str,
    pub kind: MemberKind,
    pub module: &'static str,
    pub params: &'static [&'static str],
    pub returns: TypeTag,
    pub doc: &'static str,
}

const fn method(
    name: &'static str,
    module: &'static str,
    params: &'static [&'static str],
    returns: TypeTag,
    doc: &'static str,
) -> Member {
    Member {
        name,
        kind: MemberKind::Method,
        module,
        params,
        returns,
        doc,
    }
}

const fn property(
    name: &'static str,
    module: &'static str,
    returns: TypeTag,
    doc: &'static str,
) -> Member {
    Member {
        name,
        kind: MemberKind::Property,
        module,
        params: &[],
        returns,
        doc,
    }
}

const CLIENT_MEMBERS: &[Member] = &[
    method(
        "get_collection",
        CLIENT_MODULE,
        &["name"],
        TypeTag::Collection,
        "Get a collection by name, None if it does not exist",
    ),
    method(
        "create_collection",
        CLIENT_MODULE,
        &["name"],
        TypeTag::Collection,
        "Create an empty collection",
    ),
    property(
        "is_closed",
        CLIENT_MODULE,
        TypeTag::Bool,
        "Whether the client has been closed",
    ),
    property("uri", CLIENT_MODULE, TypeTag::Str, "Storage URI"),
    property(
        "_options",
        CLIENT_MODULE,
        TypeTag::Json,
        "Options the client was constructed with",
    ),
    property(
        "__class__",
        BUILTINS_MODULE,
        TypeTag::ClientClass,
        "Class of the object",
    ),
    property(
        "__doc__",
        BUILTINS_MODULE,
        TypeTag::Str,
        "Documentation string",
    ),
];

const COLLECTION_MEMBERS: &[Member] = &[
    property("name", CLIENT_MODULE, TypeTag::Str, "Collection name"),
    property(
        "path",
        CLIENT_MODULE,
        TypeTag::Str,
        "Directory holding the collection",
    ),
    property(
        "metadata",
        CLIENT_MODULE,
        TypeTag::Json,
        "Collection metadata",
    ),
    property(
        "__class__",
        BUILTINS_MODULE,
        TypeTag::CollectionClass,
        "Class of the object",
    ),
    property(
        "__doc__",
        BUILTINS_MODULE,
        TypeTag::Str,
        "Documentation string",
    ),
];

const CLASS_MEMBERS: &[Member] = &[
    method(
        "mro",
        BUILTINS_MODULE,
        &[],
        TypeTag::List,
        "Method resolution order",
    ),
    property("__name__", BUILTINS_MODULE, TypeTag::Str, "Class name"),
    property(
        "__doc__",
        BUILTINS_MODULE,
        TypeTag::Str,
        "Documentation string",
    ),
];

const STR_MEMBERS: &[Member] = &[
    method("lower", BUILTINS_MODULE, &[], TypeTag::Str, "Lowercased copy"),
    method("upper", BUILTINS_MODULE, &[], TypeTag::Str, "Uppercased copy"),
    method(
        "startswith",
        BUILTINS_MODULE,
        &["prefix"],
        TypeTag::Bool,
        "Whether the string starts with prefix",
    ),
    method(
        "split",
        BUILTINS_MODULE,
        &["sep"],
        TypeTag::List,
        "Split on sep, or on whitespace when omitted",
    ),
];

const LIST_MEMBERS: &[Member] = &[
    method(
        "count",
        BUILTINS_MODULE,
        &["value"],
        TypeTag::Int,
        "Number of occurrences of value",
    ),
    method(
        "index",
        BUILTINS_MODULE,
        &["value"],
        TypeTag::Int,
        "Position of the first occurrence of value",
    ),
];

const JSON_MEMBERS: &[Member] = &[
    method("keys", BUILTINS_MODULE, &[], TypeTag::List, "Mapping keys"),
    method(
        "get",
        BUILTINS_MODULE,
        &["key"],
        TypeTag::Json,
        "Value for key, None if missing",
    ),
];

pub(crate) const CLIENT_DOC: &str = "Storage client. Lists, opens and creates collections.";
pub(crate) const COLLECTION_DOC: &str = "A named collection of arrays managed by a client.";

impl TypeTag {
    /// Type name as shown to the user
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::NoneType => "NoneType",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "str",
            TypeTag::List => "list",
            TypeTag::Json => "dict",
            TypeTag::Client => "Client",
            TypeTag::Collection => "Collection",
            TypeTag::ClientClass | TypeTag::CollectionClass => "type",
            TypeTag::Builtin(_) => "builtin_function_or_method",
            TypeTag::Method => "method",
        }
    }

    /// Attributes of the type, in declaration order
    pub fn members(self) -> &'static [Member] {
        match self {
            TypeTag::Client => CLIENT_MEMBERS,
            TypeTag::Collection => COLLECTION_MEMBERS,
            TypeTag::ClientClass | TypeTag::CollectionClass => CLASS_MEMBERS,
            TypeTag::Str => STR_MEMBERS,
            TypeTag::List => LIST_MEMBERS,
            TypeTag::Json => JSON_MEMBERS,
            _ => &[],
        }
    }

    /// Look up one attribute
    pub fn member(self, name: &str) -> Option<&'static Member> {
        self.members().iter().find(|m| m.name == name)
    }

    /// Parameters accepted when a value of this type is called
    pub fn call_params(self) -> Option<&'static [&'static str]> {
        match self {
            TypeTag::Builtin(builtin) => Some(builtin.params()),
            TypeTag::ClientClass => Some(CLIENT_PARAMS),
            _ => None,
        }
    }

    /// Result type of calling a value of this type
    pub fn call_result(self) -> Option<TypeTag> {
        match self {
            TypeTag::Builtin(builtin) => Some(builtin.returns()),
            TypeTag::ClientClass => Some(TypeTag::Client),
            _ => None,
        }
    }

    /// Whether values of this type can be called
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            TypeTag::Builtin(_)
                | TypeTag::ClientClass
                | TypeTag::CollectionClass
                | TypeTag::Method
        )
    }
}

impl Builtin {
    pub const ALL: [Builtin; 7] = [
        Builtin::Use,
        Builtin::GetGlobalCollVariable,
        Builtin::Help,
        Builtin::Print,
        Builtin::Len,
        Builtin::Exit,
        Builtin::Quit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Use => "use",
            Builtin::GetGlobalCollVariable => "get_global_coll_variable",
            Builtin::Help => "help",
            Builtin::Print => "print",
            Builtin::Len => "len",
            Builtin::Exit => "exit",
            Builtin::Quit => "quit",
        }
    }

    /// Shell helpers live in the shell module, the rest are language builtins
    pub fn module(self) -> &'static str {
        match self {
            Builtin::Use | Builtin::GetGlobalCollVariable | Builtin::Help => SHELL_MODULE,
            _ => BUILTINS_MODULE,
        }
    }

    pub fn params(self) -> &'static [&'static str] {
        match self {
            Builtin::Use => &["name"],
            Builtin::Help => &["obj"],
            Builtin::Print => &["value"],
            Builtin::Len => &["obj"],
            Builtin::GetGlobalCollVariable | Builtin::Exit | Builtin::Quit => &[],
        }
    }

    pub fn returns(self) -> TypeTag {
        match self {
            Builtin::GetGlobalCollVariable => TypeTag::Collection,
            Builtin::Len => TypeTag::Int,
            _ => TypeTag::NoneType,
        }
    }

    pub fn doc(self) -> &'static str {
        match self {
            Builtin::Use => "Set the 'collection' variable to the collection with this name",
            Builtin::GetGlobalCollVariable => "Return the current 'collection' variable",
            Builtin::Help => "Show the shell overview, or the documentation of an object",
            Builtin::Print => "Print values separated by spaces",
            Builtin::Len => "Number of items in a string, list or mapping",
            Builtin::Exit | Builtin::Quit => "Leave the shell",
        }
    }

    /// Resolve a builtin by its bound name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}
