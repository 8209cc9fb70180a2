use assert_cmd::Command;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

const TWO_INSTANCES: &str = r#"{"status":"success","data":{"result":[{"metric":{"instance":"a"},"values":[[100,"1.5"],[200,"2.0"]]},{"metric":{"instance":"b"},"values":[[200,"3.0"]]}]}}"#;

const EMPTY: &str = r#"{"status":"success","data":{"resultType":"matrix","result":[]}}"#;

/// A backend that answers exactly one request with `body`. The handle
/// yields the request line it received.
fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();

        let mut request = Vec::new();
        let mut buf = [0; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (format!("http://{addr}"), handle)
}

fn styx() -> Command {
    Command::cargo_bin("styx").unwrap()
}

#[test]
fn exports_csv_with_header() {
    let (url, server) = serve_once("200 OK", TWO_INSTANCES);

    let output = styx()
        .args(["--prometheus", &url, "-r", "-s", "100", "-e", "200", "up"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "timestamp,instance=a,instance=b\n100,1.5,\n200,2.0,3.0\n"
    );

    let request = server.join().unwrap();
    assert!(request.starts_with("GET /api/v1/query_range?query=up&start=100&end=200&step=1 "));
}

#[test]
fn exports_csv_without_header() {
    let (url, server) = serve_once("200 OK", TWO_INSTANCES);

    let output = styx()
        .args(["--prometheus", &url, "--header=false", "up"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "100,1.5,\n200,2.0,3.0\n"
    );
    server.join().unwrap();
}

#[test]
fn empty_result_is_header_only() {
    let (url, server) = serve_once("200 OK", EMPTY);

    let output = styx().args(["--prometheus", &url, "up"]).output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "timestamp\n");
    server.join().unwrap();
}

#[test]
fn backend_error_fails_without_output() {
    let (url, server) = serve_once("200 OK", r#"{"status":"error","error":"bad query"}"#);

    let output = styx().args(["--prometheus", &url, "up{"]).output().unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8(output.stderr).unwrap().contains("bad query"));
    server.join().unwrap();
}

#[test]
fn missing_query_fails() {
    let output = styx().output().unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("need a query to run"));
}

#[test]
fn unreachable_backend_fails() {
    let addr = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let output = styx()
        .args(["--prometheus", &format!("http://{addr}"), "up"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8(output.stderr).unwrap().contains("unreachable"));
}

#[test]
fn inverted_range_fails() {
    let output = styx()
        .args(["-r", "-s", "200", "-e", "100", "up"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("invalid time window"));
}

#[test]
fn config_file_supplies_defaults() {
    let (url, server) = serve_once("200 OK", TWO_INSTANCES);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[general]\nprometheus = \"{url}\"\nheader = false").unwrap();

    let output = styx()
        .arg("--config")
        .arg(file.path())
        .arg("up")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "100,1.5,\n200,2.0,3.0\n"
    );
    server.join().unwrap();
}

#[test]
fn gnuplot_prints_script() {
    let (url, server) = serve_once("200 OK", TWO_INSTANCES);

    let output = styx()
        .args(["gnuplot", "--print", "--prometheus", &url, "--title", "Up", "up"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let script = String::from_utf8(output.stdout).unwrap();
    assert!(script.starts_with("set title \"Up\" noenhanced\n"));
    assert!(script.contains("100,1.5,\n200,2.0,3.0\nEOD\n"));
    server.join().unwrap();
}

#[test]
fn matplotlib_writes_file() {
    let (url, server) = serve_once("200 OK", TWO_INSTANCES);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plot.py");

    let output = styx()
        .args(["matplotlib", "--prometheus", &url, "up", "-o"])
        .arg(&path)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let script = std::fs::read_to_string(&path).unwrap();
    assert!(script.contains("(\"instance=a\", [100, 200], [1.5, 2.0]),"));
    server.join().unwrap();
}

#[test]
fn plot_of_empty_result_fails() {
    let (url, server) = serve_once("200 OK", EMPTY);

    let output = styx()
        .args(["matplotlib", "--prometheus", &url, "up"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr)
        .unwrap()
        .contains("no series"));
    server.join().unwrap();
}
