use fpl_config::{DumpKind, FplBuildConfig, FplConfig, StopAt};
use fpl_driver::{build_files, check_files};
use tempfile::TempDir;

const SUM: &str = "fun main() -> Int
    val x = 1
    val y = 2
    return x + y
";

fn config_for(build: FplBuildConfig) -> FplConfig {
  let mut config = FplConfig::silent();
  config.build_config = Some(build);
  config
}

fn write_source(
  dir: &TempDir,
  name: &str,
  text: &str,
) -> String {
  let path = dir.path().join(name);
  std::fs::write(&path, text).unwrap();
  path.to_string_lossy().into_owned()
}

#[test]
fn build_writes_assembly_next_to_the_source() {
  let dir = TempDir::new().unwrap();
  let main = write_source(&dir, "main.fpl", SUM);

  let config = config_for(FplBuildConfig {
    files: vec![main],
    ..FplBuildConfig::default()
  });
  assert!(build_files(&config).is_ok());

  let asm = std::fs::read_to_string(dir.path().join("main.f32")).unwrap();
  assert_eq!(asm, "# Generated by fplc\n/main():\nld R8, 3\nret\n\n");
}

#[test]
fn build_writes_dumps_and_symbol_map() {
  let dir = TempDir::new().unwrap();
  let main = write_source(&dir, "main.fpl", SUM);
  let dumps = dir.path().join("dumps");
  let map = dir.path().join("symbol-map.json");

  let config = config_for(FplBuildConfig {
    files: vec![main],
    output: Some(dir.path().join("out.f32").to_string_lossy().into_owned()),
    stop_at: StopAt::Assembly,
    dump: vec![DumpKind::Ir, DumpKind::Symbols],
    dump_dir: Some(dumps.to_string_lossy().into_owned()),
    symbol_map: Some(map.to_string_lossy().into_owned()),
    check_mode: false,
  });
  assert!(build_files(&config).is_ok());

  assert!(dir.path().join("out.f32").exists());
  let ir = std::fs::read_to_string(dumps.join("dump-ir.txt")).unwrap();
  assert!(ir.starts_with("Function /main()\nstart\n"));
  let table = std::fs::read_to_string(dumps.join("dump-symbols.txt")).unwrap();
  assert!(table.contains("main.fpl:"));

  let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(map).unwrap()).unwrap();
  let names: Vec<&str> = json["symbols"]
    .as_array()
    .unwrap()
    .iter()
    .filter_map(|s| s["name"].as_str())
    .collect();
  assert!(names.contains(&"x"));
  assert!(names.contains(&"y"));
}

#[test]
fn check_reports_errors_and_writes_no_output() {
  let dir = TempDir::new().unwrap();
  let main = write_source(&dir, "main.fpl", "fun f() -> Int\n    return y\n");

  let config = config_for(FplBuildConfig {
    files: vec![main],
    ..FplBuildConfig::default()
  });
  assert!(check_files(&config).is_err());
  assert!(!dir.path().join("main.f32").exists());
}

#[test]
fn check_accepts_a_valid_program_without_writing() {
  let dir = TempDir::new().unwrap();
  let main = write_source(&dir, "main.fpl", SUM);

  let config = config_for(FplBuildConfig {
    files: vec![main],
    ..FplBuildConfig::default()
  });
  assert!(check_files(&config).is_ok());
  assert!(!dir.path().join("main.f32").exists());
}

#[test]
fn missing_input_file_fails() {
  let dir = TempDir::new().unwrap();
  let config = config_for(FplBuildConfig {
    files: vec![dir.path().join("absent.fpl").to_string_lossy().into_owned()],
    ..FplBuildConfig::default()
  });
  assert!(build_files(&config).is_err());
}
