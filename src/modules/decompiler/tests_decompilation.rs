// Decompilation handle and front door against a scripted transport.
use std::sync::Arc;

use serde_json::{Value, json};

use super::*;
use crate::cores::resource::{OnFailure, STATE_UPDATE_INTERVAL};
use crate::errors::RetdecError;
use crate::testing::{ManualClock, ScriptedTransport, decompilation_status, generation};

fn setup(statuses: Vec<Value>) -> (Decompilation, Arc<ScriptedTransport>, Arc<ManualClock>) {
    setup_with(ScriptedTransport::new(statuses))
}

fn setup_with(conn: ScriptedTransport) -> (Decompilation, Arc<ScriptedTransport>, Arc<ManualClock>) {
    let conn = Arc::new(conn);
    let clock = Arc::new(ManualClock::new());
    let dec = Decompiler::with_connection(conn.clone())
        .with_clock(clock.clone())
        .run_decompilation(&DecompilationArguments::new("prog.exe"))
        .unwrap();
    (dec, conn, clock)
}

fn with(mut status: Value, key: &str, value: Value) -> Value {
    status[key] = value;
    status
}

#[test]
fn run_decompilation_uploads_once_and_wraps_id() {
    let (dec, conn, _) = setup(vec![]);
    assert_eq!(dec.id(), "ID");
    let posts = conn.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].path, "");
    assert_eq!(posts[0].params.get("mode"), Some("bin"));
    assert_eq!(posts[0].files[0].field, "input");
    assert_eq!(conn.status_requests(), 0);
}

#[test]
fn invalid_arguments_never_reach_the_network() {
    let conn = Arc::new(ScriptedTransport::new(vec![]));
    let decompiler = Decompiler::with_connection(conn.clone());

    let err = decompiler.run_decompilation(&DecompilationArguments::default()).unwrap_err();
    assert!(matches!(err, RetdecError::MissingParameter { .. }));

    let err = decompiler
        .run_decompilation(&DecompilationArguments::new("prog.c").graph_format("gif"))
        .unwrap_err();
    assert!(matches!(err, RetdecError::InvalidValue { .. }));
    assert!(conn.posts().is_empty());
}

#[test]
fn c_input_is_sent_in_c_mode() {
    let conn = Arc::new(ScriptedTransport::new(vec![]));
    Decompiler::with_connection(conn.clone())
        .run_decompilation(&DecompilationArguments::new("/tmp/Prog.C"))
        .unwrap();
    assert_eq!(conn.posts()[0].params.get("mode"), Some("c"));
}

#[test]
fn one_fetch_updates_every_sub_state() {
    let status = decompilation_status(40, false, false, None);
    let status = with(status, "phases", json!([
        {"name": "Init", "part": null, "description": "Initializing", "completion": 0, "warnings": ["w"]},
        {"name": "Front-End", "part": "Front-End", "description": "Parsing", "completion": 40}
    ]));
    let status = with(status, "archive", generation(false, false, None));
    let status = with(status, "cfgs", json!({"main": generation(true, false, None)}));
    let (mut dec, conn, _) = setup(vec![status]);

    assert_eq!(dec.get_completion().unwrap(), 40);
    let phases = dec.get_phases().unwrap();
    assert_eq!(phases.len(), 2);
    assert_eq!(phases[0].warnings, vec!["w".to_string()]);
    assert_eq!(phases[1].part.as_deref(), Some("Front-End"));
    assert!(!dec.archive_generation_has_finished().unwrap());
    assert!(dec.cfg_generation_has_succeeded("main").unwrap());
    assert_eq!(dec.funcs_with_cfg().unwrap(), vec!["main".to_string()]);
    assert_eq!(conn.status_requests(), 1);
}

#[test]
fn each_refresh_replaces_phases_and_outputs() {
    let first = with(
        with(decompilation_status(10, false, false, None), "phases", json!([
            {"name": "Init", "part": null, "description": "Initializing", "completion": 10}
        ])),
        "archive",
        generation(false, false, None),
    );
    let second = with(
        with(decompilation_status(40, false, false, None), "phases", json!([
            {"name": "Init", "part": null, "description": "Initializing", "completion": 10},
            {"name": "Front-End", "part": "Front-End", "description": "Parsing", "completion": 40}
        ])),
        "archive",
        generation(true, false, None),
    );
    let third = with(decompilation_status(60, false, false, None), "phases", second["phases"].clone());
    let (mut dec, conn, clock) = setup(vec![first, second, third]);

    let before = dec.get_phases().unwrap();
    assert_eq!(before.len(), 1);
    assert!(!dec.archive_generation_has_finished().unwrap());

    clock.advance(STATE_UPDATE_INTERVAL);
    let after = dec.get_phases().unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[1].description, "Parsing");
    assert!(after.last().unwrap().completion >= before.last().unwrap().completion);
    assert!(dec.archive_generation_has_succeeded().unwrap());

    // a status without the key means the archive is no longer reported
    clock.advance(STATE_UPDATE_INTERVAL);
    assert!(matches!(
        dec.archive_generation_has_finished(),
        Err(RetdecError::OutputNotRequested { output }) if output == "archive"
    ));
    assert_eq!(dec.get_completion().unwrap(), 60);
    assert_eq!(dec.get_phases().unwrap(), after);
    assert_eq!(conn.status_requests(), 3);
}

#[test]
fn not_requested_outputs_raise_on_every_accessor() {
    let (mut dec, _, _) = setup(vec![decompilation_status(100, true, false, None)]);
    assert!(matches!(dec.archive_generation_has_finished(), Err(RetdecError::OutputNotRequested { .. })));
    assert!(matches!(dec.archive_generation_has_succeeded(), Err(RetdecError::OutputNotRequested { .. })));
    assert!(matches!(dec.archive_generation_has_failed(), Err(RetdecError::OutputNotRequested { .. })));
    assert!(matches!(dec.get_archive_generation_error(), Err(RetdecError::OutputNotRequested { .. })));
    assert!(matches!(dec.cg_generation_has_finished(), Err(RetdecError::OutputNotRequested { .. })));
    assert!(matches!(dec.get_cg_generation_error(), Err(RetdecError::OutputNotRequested { .. })));
    assert!(matches!(dec.cfg_generation_has_failed("main"), Err(RetdecError::OutputNotRequested { .. })));
    assert!(dec.funcs_with_cfg().unwrap().is_empty());
}

#[test]
fn waiting_for_not_requested_output_fails_on_first_check() {
    let (mut dec, conn, clock) = setup(vec![decompilation_status(10, false, false, None)]);
    let err = dec.wait_until_cg_is_generated(OnFailure::Raise).unwrap_err();
    assert!(matches!(err, RetdecError::OutputNotRequested { output } if output == "cg"));
    assert_eq!(conn.status_requests(), 1);
    assert!(clock.sleeps().is_empty());
}

#[test]
fn unknown_cfg_function_is_no_such_cfg() {
    let status = with(
        decompilation_status(100, true, false, None),
        "cfgs",
        json!({"my_func": generation(true, false, None), "main": generation(false, false, None)}),
    );
    let (mut dec, _, _) = setup(vec![status]);
    assert!(matches!(dec.cfg_generation_has_finished("other"), Err(RetdecError::NoSuchCfg { func }) if func == "other"));
    assert_eq!(dec.funcs_with_cfg().unwrap(), vec!["main".to_string(), "my_func".to_string()]);
}

#[test]
fn archive_wait_polls_until_generated() {
    let running = with(decompilation_status(100, true, false, None), "archive", generation(false, false, None));
    let done = with(decompilation_status(100, true, false, None), "archive", generation(true, false, None));
    let (mut dec, conn, clock) = setup(vec![running.clone(), running, done]);
    dec.wait_until_archive_is_generated(OnFailure::Raise).unwrap();
    assert!(dec.archive_generation_has_succeeded().unwrap());
    assert_eq!(conn.status_requests(), 3);
    assert_eq!(clock.sleeps(), vec![STATE_UPDATE_INTERVAL, STATE_UPDATE_INTERVAL]);
}

#[test]
fn output_failures_use_their_own_errors() {
    let status = decompilation_status(100, true, false, None);
    let status = with(status, "archive", generation(false, true, Some("no space")));
    let status = with(status, "cg", generation(false, true, Some("cg err")));
    let status = with(status, "cfgs", json!({"main": generation(false, true, Some("cfg err"))}));
    let (mut dec, _, _) = setup(vec![status]);

    let err = dec.wait_until_archive_is_generated(OnFailure::Raise).unwrap_err();
    assert!(matches!(err, RetdecError::ArchiveGenerationFailed(m) if m == "no space"));
    let err = dec.wait_until_cg_is_generated(OnFailure::Raise).unwrap_err();
    assert!(matches!(err, RetdecError::CgGenerationFailed(m) if m == "cg err"));
    let err = dec.wait_until_cfg_is_generated("main", OnFailure::Raise).unwrap_err();
    assert!(matches!(err, RetdecError::CfgGenerationFailed { func, error } if func == "main" && error == "cfg err"));

    dec.wait_until_cg_is_generated(OnFailure::Ignore).unwrap();
    assert_eq!(dec.get_cg_generation_error().unwrap().as_deref(), Some("cg err"));
}

#[test]
fn failed_decompilation_raises_decompilation_failed() {
    let (mut dec, _, _) = setup(vec![decompilation_status(30, true, true, Some("bad input"))]);
    let err = dec.wait_until_finished(OnFailure::Raise).unwrap_err();
    assert!(matches!(err, RetdecError::DecompilationFailed(m) if m == "bad input"));
}

#[test]
fn progress_callback_sees_completion_changes() {
    let (mut dec, _, _) = setup(vec![
        decompilation_status(0, false, false, None),
        decompilation_status(15, false, false, None),
        decompilation_status(100, true, false, None),
    ]);
    let mut seen = Vec::new();
    dec.wait_until_finished_with(
        |d: &Decompilation| seen.push(d.snapshot().map(|s| s.completion)),
        OnFailure::Raise,
    )
    .unwrap();
    assert_eq!(seen, vec![Some(15), Some(100)]);
}

#[test]
fn outputs_are_downloaded_unchanged() {
    let binary: &[u8] = &[0x7f, b'E', b'L', b'F', 0x00, 0xff];
    let conn = ScriptedTransport::new(vec![decompilation_status(100, true, false, None)])
        .with_file("/ID/outputs/hll", "prog.c", b"int main() {}")
        .with_file("/ID/outputs/dsm", "prog.dsm", b"; dsm")
        .with_file("/ID/outputs/binary", "prog.out", binary)
        .with_file("/ID/outputs/cfgs/main", "prog.cfg.main.svg", b"<svg/>");
    let (dec, _, _) = setup_with(conn);

    assert_eq!(dec.get_hll_code().unwrap(), "int main() {}");
    assert_eq!(dec.get_dsm_code().unwrap(), "; dsm");
    assert_eq!(dec.get_binary().unwrap(), binary);

    let dir = std::env::temp_dir().join(format!("retdec_dec_outputs_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let saved = dec.save_cfg("main", Some(dir.as_path())).unwrap();
    assert_eq!(saved, dir.join("prog.cfg.main.svg"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"<svg/>");
    let saved = dec.save_binary(Some(dir.as_path())).unwrap();
    assert_eq!(std::fs::read(&saved).unwrap(), binary);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_output_surfaces_api_error() {
    let (dec, _, _) = setup(vec![]);
    assert!(matches!(dec.save_archive(Some(std::path::Path::new("."))), Err(RetdecError::UnknownApi { code: 404, .. })));
}

#[test]
fn display_names_the_decompilation() {
    let (dec, _, _) = setup(vec![]);
    assert_eq!(dec.to_string(), "decompilation id=ID");
}
