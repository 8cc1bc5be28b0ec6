//! Identifiers the generated code must not redeclare.
//!
//! Lists are kept sorted so membership is a binary search.

/// C, C++ and Objective-C keywords, Foundation and runtime typedefs and
/// macros, and C library functions visible in every translation unit.
const RESERVED: &[&str] = &[
    "BOOL",
    "CGFloat",
    "Class",
    "DEBUG",
    "EOF",
    "FALSE",
    "FOUNDATION_EXPORT",
    "IMP",
    "INFINITY",
    "IOSClass",
    "NAN",
    "NDEBUG",
    "NO",
    "NSInteger",
    "NSObject",
    "NSString",
    "NSUInteger",
    "NULL",
    "Nil",
    "Protocol",
    "SEL",
    "TRUE",
    "YES",
    "_Bool",
    "_Complex",
    "_Imaginary",
    "__strong",
    "__weak",
    "_cmd",
    "abort",
    "abs",
    "and",
    "and_eq",
    "asm",
    "assert",
    "atexit",
    "atof",
    "atoi",
    "atol",
    "auto",
    "bitand",
    "bitor",
    "bool",
    "break",
    "bycopy",
    "byref",
    "bzero",
    "calloc",
    "case",
    "catch",
    "char",
    "class",
    "clock",
    "compl",
    "const",
    "const_cast",
    "continue",
    "default",
    "delete",
    "do",
    "double",
    "dynamic_cast",
    "else",
    "enum",
    "errno",
    "exit",
    "explicit",
    "export",
    "extern",
    "false",
    "float",
    "fmod",
    "fmodf",
    "for",
    "free",
    "friend",
    "getenv",
    "goto",
    "id",
    "if",
    "in",
    "index",
    "inline",
    "inout",
    "instancetype",
    "int",
    "jboolean",
    "jbyte",
    "jchar",
    "jdouble",
    "jfloat",
    "jint",
    "jlong",
    "jshort",
    "long",
    "main",
    "malloc",
    "memcmp",
    "memcpy",
    "memmove",
    "memset",
    "mutable",
    "namespace",
    "new",
    "nil",
    "nil_chk",
    "not",
    "not_eq",
    "oneway",
    "operator",
    "or",
    "or_eq",
    "out",
    "printf",
    "private",
    "protected",
    "public",
    "qsort",
    "rand",
    "random",
    "realloc",
    "register",
    "reinterpret_cast",
    "restrict",
    "return",
    "rindex",
    "self",
    "short",
    "signal",
    "signed",
    "sizeof",
    "sleep",
    "sprintf",
    "srand",
    "stat",
    "static",
    "static_cast",
    "stderr",
    "stdin",
    "stdout",
    "strcmp",
    "strcpy",
    "strlen",
    "struct",
    "super",
    "switch",
    "template",
    "this",
    "throw",
    "time",
    "true",
    "try",
    "typedef",
    "typeid",
    "typename",
    "typeof",
    "union",
    "unsigned",
    "using",
    "virtual",
    "void",
    "volatile",
    "wchar_t",
    "while",
    "xor",
    "xor_eq",
];

/// Messages every `NSObject` responds to. A source method with one of
/// these names would silently override runtime behavior.
const NSOBJECT_MESSAGES: &[&str] = &[
    "alloc",
    "attributeKeys",
    "autoContentAccessingProxy",
    "autorelease",
    "classCode",
    "classDescription",
    "classFallbacksForKeyedArchiver",
    "classForArchiver",
    "classForCoder",
    "classForKeyedArchiver",
    "classForPortCoder",
    "className",
    "copy",
    "dealloc",
    "description",
    "hash",
    "init",
    "initialize",
    "isProxy",
    "load",
    "mutableCopy",
    "new",
    "release",
    "retain",
    "retainCount",
    "scriptingProperties",
    "self",
    "superclass",
    "toManyRelationshipKeys",
    "toOneRelationshipKeys",
    "version",
    "zone",
];

/// Objective-C parameter type qualifiers; illegal as parameter names.
const PARAM_QUALIFIERS: &[&str] = &["bycopy", "byref", "in", "inout", "oneway", "out"];

pub(crate) fn is_reserved(name: &str) -> bool {
    RESERVED.binary_search(&name).is_ok()
}

pub(crate) fn is_nsobject_message(name: &str) -> bool {
    NSOBJECT_MESSAGES.binary_search(&name).is_ok()
}

pub(crate) fn is_param_qualifier(name: &str) -> bool {
    PARAM_QUALIFIERS.binary_search(&name).is_ok()
}
