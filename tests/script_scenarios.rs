use dfalang::{
    CaptureBuffer, DfalangError, Interpreter, Output, ParseError, Report, ReportFormat,
    RuntimeError,
};
use std::path::PathBuf;

fn script(name: &str) -> String {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "scripts", name]
        .iter()
        .collect();
    std::fs::read_to_string(&path).expect("Failed to load script")
}

fn interpreter(format: ReportFormat) -> (Interpreter, CaptureBuffer) {
    let (output, buffer) = Output::capture(format);
    (Interpreter::new(output), buffer)
}

const X: &str = "x = DFA { S=2 A={'a'} T={(1,'a',2)} F={2} }";

#[tokio::test]
async fn test_single_letter_accepted() {
    let (mut interp, buffer) = interpreter(ReportFormat::Text);
    interp
        .run_source(&format!("{}\nAccept \"a\" With x", X))
        .await
        .unwrap();

    assert!(buffer
        .lines()
        .contains(&"String a is accepted with the automaton x".to_string()));
}

#[tokio::test]
async fn test_run_past_last_transition_rejected() {
    let (mut interp, buffer) = interpreter(ReportFormat::Text);
    interp
        .run_source(&format!("{}\nAccept \"aa\" With x", X))
        .await
        .unwrap();

    assert!(buffer
        .lines()
        .contains(&"String aa is not accepted with the automaton x".to_string()));
}

#[tokio::test]
async fn test_out_of_range_definition_is_not_bound() {
    let (mut interp, buffer) = interpreter(ReportFormat::Text);
    let err = interp.run_source(&script("broken_definition.dfa")).await.unwrap_err();

    match err {
        DfalangError::Runtime(RuntimeError::InvalidDefinition(name)) => assert_eq!(name, "y"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(interp.environment().names().collect::<Vec<_>>(), vec!["x"]);
    assert_eq!(buffer.lines().last().unwrap(), "Invalid automaton definition y");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_multi_accept_produces_one_report_per_automaton() {
    let (mut interp, buffer) = interpreter(ReportFormat::Json);
    let src = format!(
        "{}\ny = DFA {{ S=1 A={{'b'}} T={{(1,'b',1)}} F={{1}} }}\nAccept \"b\" With {{ x, y }}",
        X
    );
    interp.run_source(&src).await.unwrap();

    let mut verdicts: Vec<(String, bool)> = buffer
        .lines()
        .iter()
        .map(|line| serde_json::from_str::<Report>(line).unwrap())
        .filter_map(|report| match report {
            Report::Verdict {
                automaton,
                accepted,
                ..
            } => Some((automaton, accepted)),
            _ => None,
        })
        .collect();
    verdicts.sort();

    assert_eq!(
        verdicts,
        vec![("x".to_string(), false), ("y".to_string(), true)]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_multi_accept_mixed_failures() {
    let (mut interp, buffer) = interpreter(ReportFormat::Json);
    let src = format!(
        "{}\nAccept \"a\" With {{ x, ghost, x, phantom }}\nPrint x",
        X
    );
    interp.run_source(&src).await.unwrap();

    let reports: Vec<Report> = buffer
        .lines()
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let verdicts = reports
        .iter()
        .filter(|r| matches!(r, Report::Verdict { .. }))
        .count();
    let errors = reports
        .iter()
        .filter(|r| matches!(r, Report::Error { .. }))
        .count();
    assert_eq!(verdicts, 2);
    assert_eq!(errors, 2);

    // the statement completed before the following Print ran
    assert!(matches!(reports.last(), Some(Report::Printed { .. })));
}

#[tokio::test]
async fn test_parity_script() {
    let (mut interp, buffer) = interpreter(ReportFormat::Text);
    interp.run_source(&script("parity.dfa")).await.unwrap();

    let lines = buffer.lines();
    assert!(lines.contains(&"Defined automaton odd = {".to_string()));
    assert!(lines.contains(&"Automaton evenb = {".to_string()));
    assert!(lines.contains(&"String ab is accepted with the automaton odd".to_string()));
    assert!(lines.contains(&"String abb is accepted with the automaton evenb".to_string()));
    assert!(lines.contains(&"String aab is not accepted with the automaton odd".to_string()));
    assert!(lines.contains(&"String aab is not accepted with the automaton evenb".to_string()));
    assert_eq!(
        interp.environment().names().collect::<Vec<_>>(),
        vec!["odd", "evenb"]
    );
}

#[tokio::test]
async fn test_syntax_error_script() {
    let (mut interp, buffer) = interpreter(ReportFormat::Text);
    let err = interp.run_source(&script("syntax_error.dfa")).await.unwrap_err();

    assert!(matches!(
        err,
        DfalangError::Parse(ParseError::Syntax { line: 4, .. })
    ));
    assert_eq!(
        buffer.lines(),
        vec!["Expected 'With', but got identifier near line 4"]
    );
    assert!(interp.environment().is_empty());
}

#[tokio::test]
async fn test_definitions_counted_regardless_of_interleaving() {
    let (mut interp, _buffer) = interpreter(ReportFormat::Text);
    let mut src = String::new();
    for i in 0..5 {
        src.push_str(&format!(
            "d{} = DFA {{ S=1 A={{'a'}} T={{(1,'a',1)}} F={{1}} }}\nPrint d{}\nAccept \"a\" With {{ d0, d{} }}\n",
            i, i, i
        ));
    }
    interp.run_source(&src).await.unwrap();

    assert_eq!(
        interp.environment().names().collect::<Vec<_>>(),
        vec!["d0", "d1", "d2", "d3", "d4"]
    );
}

#[tokio::test]
async fn test_json_stream_is_one_object_per_line() {
    let (mut interp, buffer) = interpreter(ReportFormat::Json);
    interp.run_source(&script("parity.dfa")).await.unwrap();

    for line in buffer.lines() {
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(value.get("event").is_some());
    }
}
