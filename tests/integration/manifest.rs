mod common;
use common::{ore_dict, registry, string_utils, zenreg};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use zenreg::brackets::{BracketPattern, PatternBracketHandler};
use zenreg::diagnostics::CollectingLogger;
use zenreg::manifest::Manifest;
use zenreg::{ManifestError, Symbol};

const MANIFEST: &str = r#"
[registry]
unit_prefix = "gen_"

[[class]]
name = "mods.ore.OreDict"

[[class.members]]
name = "get"
kind = "method"
params = ["string"]
returns = "mods.ore.OreEntry"
static = true
expose = "static-method"

[[class.members]]
name = "size"
kind = "method"
returns = "int"
static = true

[[class.members]]
name = "INSTANCE"
kind = "field"
type = "mods.ore.OreDict"
static = true

[[class.members]]
name = "entries"
kind = "field"
type = "List<mods.ore.OreEntry>"

[[class]]
name = "ext.StringUtils"
markers = [{ kind = "expansion", value = "string" }]

[[class.members]]
name = "reverse"
kind = "method"
params = ["string"]
returns = "string"
static = true
expose = "method"

[[class.members]]
name = "lengthOf"
kind = "method"
params = ["string"]
returns = "int"
static = true
expose = "getter"
script_name = "length"

[[adapter]]
class = "mods.ore.OreDict"
package = "util"
methods = ["size"]

[[global]]
name = "oreDict"
class = "mods.ore.OreDict"
field = "INSTANCE"

[[global]]
name = "ore"
class = "mods.ore.OreDict"
method = "get"
params = ["string"]

[[bracket]]
name = "ore"
priority = 5
pattern = "ore:(.+)"
class = "mods.ore.OreDict"
method = "get"
"#;

fn write_manifest(dir: &tempfile::TempDir, source: &str) -> PathBuf {
    let path = dir.path().join("registry.toml");
    std::fs::write(&path, source).unwrap();
    path
}

#[test]
fn manifest_builds_the_same_registry_as_code() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, MANIFEST);
    let logger = Arc::new(CollectingLogger::new());
    let loaded = Manifest::load(&path).unwrap().build(logger.clone()).unwrap();
    assert!(logger.is_empty(), "{:?}", logger.diagnostics());

    let (mut built, _) = registry();
    built.register_native_class(&ore_dict()).unwrap();
    built.register_expansion(&string_utils()).unwrap();
    built.register_adapter(&ore_dict(), "util", &["size"]).unwrap();
    let field = built.get_static_field(&ore_dict(), "INSTANCE").unwrap();
    built.register_global("oreDict", field).unwrap();
    let get = built.get_static_function(&ore_dict(), "get", &["string"]).unwrap();
    built.register_global("ore", Arc::clone(&get)).unwrap();
    let Symbol::StaticMethod(method) = &*get else { panic!("expected a static method") };
    built.register_bracket_handler(Arc::new(PatternBracketHandler::new(
        "ore",
        5,
        BracketPattern::new("ore:(.+)").unwrap(),
        Arc::clone(method),
    )));

    assert_eq!(loaded.root(), built.root());
    assert_eq!(loaded.globals(), built.globals());
    assert_eq!(loaded.expansions(), built.expansions());
    assert_eq!(format!("{:?}", loaded.bracket_handlers()), format!("{:?}", built.bracket_handlers()));
    assert_eq!(loaded.config().unit_prefix, "gen_");

    let env = loaded.make_global_environment(BTreeMap::new());
    let symbol = zenreg::resolve_literal(&env, "<ore:dustGold>").unwrap().unwrap();
    assert_eq!(symbol.to_string(), r#"mods.ore.OreDict.get("dustGold")"#);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Manifest::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ManifestError::Io { .. }));
}

#[test]
fn adapter_for_unknown_class_is_a_hard_error() {
    let source = "[[adapter]]\nclass = \"mods.Nope\"\n";
    let manifest: Manifest = source.parse().unwrap();
    let err = manifest.build(Arc::new(CollectingLogger::new())).unwrap_err();
    assert_eq!(err.to_string(), "unknown class 'mods.Nope'");
}

#[test]
fn duplicate_global_in_manifest_is_a_hard_error() {
    let source = format!(
        "{MANIFEST}\n[[global]]\nname = \"oreDict\"\nclass = \"mods.ore.OreDict\"\nfield = \"INSTANCE\"\n"
    );
    let manifest: Manifest = source.parse().unwrap();
    let err = manifest.build(Arc::new(CollectingLogger::new())).unwrap_err();
    assert!(matches!(err, ManifestError::Registry(_)));
    assert_eq!(err.to_string(), "symbol already exists: oreDict");
}

#[test]
fn broken_class_is_logged_and_skipped() {
    let source = format!(
        "{MANIFEST}\n[[class]]\nname = \"host.Broken\"\n\n[[class.members]]\nname = \"f\"\nkind = \"method\"\nparams = [\"List<\"]\nstatic = true\nexpose = \"static-method\"\n"
    );
    let manifest: Manifest = source.parse().unwrap();
    let logger = Arc::new(CollectingLogger::new());
    let registry = manifest.build(logger.clone()).unwrap();

    assert!(registry.root().lookup("host").is_none());
    assert!(registry.root().symbol("mods.ore.OreDict").is_some());
    assert_eq!(logger.errors().len(), 1);
}

#[test]
fn cli_check_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, MANIFEST);
    let output = zenreg().arg("check").arg(&path).output().unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("2 symbol(s), 2 global(s), 1 expansion(s), 1 bracket handler(s); 0 error(s), 0 warning(s)"),
        "{stderr}"
    );
}

#[test]
fn cli_log_level_sets_the_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, MANIFEST);

    let output = zenreg().args(["--log-level", "debug", "check"]).arg(&path).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("imported manifest classes"), "{stderr}");

    // An unparsable filter falls back to warnings only.
    let output = zenreg().args(["--log-level", "[not a filter", "check"]).arg(&path).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(!String::from_utf8_lossy(&output.stderr).contains("imported manifest classes"));
}

#[test]
fn cli_resolve_prints_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, MANIFEST);

    let output = zenreg().arg("resolve").arg(&path).arg("<ore:ingotIron>").output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "mods.ore.OreDict.get(\"ingotIron\"): mods.ore.OreEntry\n"
    );

    let output = zenreg().arg("resolve").arg(&path).arg("<liquid:water>").output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unresolved bracket literal"));
}

#[test]
fn cli_dump_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, MANIFEST);
    let output = zenreg().arg("dump").arg(&path).arg("--json").output().unwrap();
    assert!(output.status.success());

    let dump: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(dump["root"], "<root>");
    assert_eq!(dump["symbols"][0]["name"], "mods.ore.OreDict");
    assert_eq!(dump["symbols"][1]["name"], "util.OreDict");
    assert_eq!(dump["globals"][0]["name"], "ore");
    assert_eq!(dump["globals"][1]["kind"], "static field");
    assert_eq!(dump["expansions"][0]["target"], "string");
    assert_eq!(dump["expansions"][0]["instance_members"], serde_json::json!(["length", "reverse"]));
    assert_eq!(dump["bracket_handlers"][0]["pattern"], "ore:(.+)");
}
