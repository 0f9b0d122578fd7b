use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

/// Run the binary in `cwd` with `args` and extra environment.
///
/// The user's config file and any `CFGCTL_*` / proxy settings from the
/// outer environment are masked so runs are hermetic.
pub fn run_cli_env(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> (i32, String, String) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cfgctl"));
    cmd.current_dir(cwd)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .env("CFGCTL_CONFIG", cwd.join("cfgctl-test-no-config.toml"))
        .env("NO_PROXY", "*");
    for var in [
        "CFGCTL_API_ORIGIN",
        "CFGCTL_SERVICE_TOKEN",
        "CFGCTL_ENVIRONMENT",
        "CFGCTL_LOG",
        "HTTP_PROXY",
        "HTTPS_PROXY",
        "ALL_PROXY",
        "http_proxy",
        "https_proxy",
        "all_proxy",
    ] {
        cmd.env_remove(var);
    }
    cmd.envs(envs.iter().copied());

    let output = cmd.output().expect("failed to spawn binary");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

pub fn run_cli(cwd: &Path, args: &[&str]) -> (i32, String, String) {
    run_cli_env(cwd, args, &[])
}

/// Serve exactly one HTTP response on a local port.
///
/// Returns the origin to point the client at and a handle that yields the
/// raw request head (request line plus headers) once it has been answered.
pub fn serve_once(status: &str, body: &str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let origin = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut head = String::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
            head.push_str(&line);
        }
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        head
    });
    (origin, handle)
}

/// Temp project with `workflows/<key>/workflow.json` for each key.
pub fn temp_project(workflows: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for key in workflows {
        let wf = dir.path().join("workflows").join(key);
        std::fs::create_dir_all(&wf).unwrap();
        std::fs::write(wf.join("workflow.json"), "{}").unwrap();
    }
    dir
}
