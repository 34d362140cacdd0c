#![allow(dead_code)]

use std::borrow::Cow;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use zenreg::brackets::{BracketHandler, BracketPattern};
use zenreg::diagnostics::CollectingLogger;
use zenreg::environment::GlobalEnvironment;
use zenreg::host::{ClassDescriptor, Exposure, Marker, MemberDescriptor};
use zenreg::lexer::{self, Token};
use zenreg::{Registry, Symbol};

pub fn zenreg() -> Command {
    Command::new(env!("CARGO_BIN_EXE_zenreg"))
}

pub fn registry() -> (Registry, Arc<CollectingLogger>) {
    let logger = Arc::new(CollectingLogger::new());
    (Registry::new(logger.clone()), logger)
}

pub fn tokens(source: &str) -> Vec<Token> {
    lexer::lex(source).unwrap()
}

/// Handler that returns a fixed result and counts how often it was asked.
pub struct FixedHandler {
    identity: String,
    priority: i32,
    pattern: BracketPattern,
    result: Option<Arc<Symbol>>,
    calls: AtomicUsize,
}

impl FixedHandler {
    pub fn new(identity: &str, priority: i32, pattern: &str, result: Option<Arc<Symbol>>) -> Arc<Self> {
        Arc::new(Self {
            identity: identity.to_string(),
            priority,
            pattern: BracketPattern::new(pattern).unwrap(),
            result,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BracketHandler for FixedHandler {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn pattern(&self) -> &BracketPattern {
        &self.pattern
    }

    fn resolve(&self, _env: &GlobalEnvironment<'_>, _tokens: &[Token]) -> Option<Arc<Symbol>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }

    fn identity(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.identity)
    }
}

pub fn ore_dict() -> ClassDescriptor {
    ClassDescriptor::new("mods.ore.OreDict")
        .with_member(
            MemberDescriptor::method("get", &["string"], "mods.ore.OreEntry")
                .make_static()
                .exposed(Exposure::StaticMethod),
        )
        .with_member(MemberDescriptor::method("size", &[], "int").make_static())
        .with_member(MemberDescriptor::field("INSTANCE", "mods.ore.OreDict").make_static())
        .with_member(MemberDescriptor::field("entries", "List<mods.ore.OreEntry>"))
}

pub fn item_stack() -> ClassDescriptor {
    ClassDescriptor::new("host.items.ItemStackImpl")
        .with_marker(Marker::Alias("mods.items.IItemStack".to_string()))
        .with_member(
            MemberDescriptor::method("withAmount", &["int"], "host.items.ItemStackImpl").exposed(Exposure::Method),
        )
        .with_member(
            MemberDescriptor::method("getAmount", &[], "int")
                .exposed(Exposure::Getter)
                .renamed("amount"),
        )
        .with_member(
            MemberDescriptor::field("EMPTY", "host.items.ItemStackImpl")
                .make_static()
                .exposed(Exposure::Getter),
        )
}

pub fn string_utils() -> ClassDescriptor {
    ClassDescriptor::new("ext.StringUtils")
        .with_marker(Marker::Expansion("string".to_string()))
        .with_member(
            MemberDescriptor::method("reverse", &["string"], "string")
                .make_static()
                .exposed(Exposure::Method),
        )
        .with_member(
            MemberDescriptor::method("lengthOf", &["string"], "int")
                .make_static()
                .exposed(Exposure::Getter)
                .renamed("length"),
        )
}
