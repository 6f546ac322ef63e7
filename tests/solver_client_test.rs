//! Solver client tests against an in-process line server

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

use everdrive_tetris::adapter::{Solver, SolverConfig, SolverConnection, TcpSolver};

/// Answer every request line with `answer`, closing after `per_conn` lines.
async fn serve(listener: TcpListener, answer: &'static str, per_conn: usize) {
    loop {
        let Ok((socket, _)) = listener.accept().await else {
            return;
        };
        tokio::spawn(async move {
            let (read_half, mut write_half) = socket.into_split();
            let mut lines = BufReader::new(read_half).lines();
            for _ in 0..per_conn {
                let Ok(Some(line)) = lines.next_line().await else {
                    return;
                };
                assert!(line.ends_with('|'), "payload must end with a pipe: {line}");
                if write_half.write_all(answer.as_bytes()).await.is_err() {
                    return;
                }
                let _ = write_half.write_all(b"\r\n").await;
                let _ = write_half.flush().await;
            }
        });
    }
}

fn config_for(port: u16, timeout_ms: u64) -> SolverConfig {
    SolverConfig {
        host: "127.0.0.1".to_string(),
        port,
        timeout_ms,
    }
}

#[tokio::test]
async fn connection_round_trips_one_line() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, "(0, 3, 10)", usize::MAX));

    let mut conn = SolverConnection::connect(&addr.to_string()).await.unwrap();
    let answer = tokio::time::timeout(Duration::from_secs(2), conn.request("0000|5|0|0|1|X......|"))
        .await
        .expect("timeout waiting for answer")
        .unwrap();
    assert_eq!(answer, "(0, 3, 10)");

    // The connection is reusable.
    let answer = conn.request("1111|5|0|0|1|X......|").await.unwrap();
    assert_eq!(answer, "(0, 3, 10)");
}

#[test]
fn tcp_solver_reconnects_after_close() {
    let rt = Runtime::new().unwrap();
    let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let port = listener.local_addr().unwrap().port();
    // One answer per connection, then the server hangs up.
    rt.spawn(serve(listener, "[1, -2, 17]", 1));

    let mut solver = TcpSolver::connect(rt.handle().clone(), config_for(port, 2000)).unwrap();
    assert_eq!(solver.best_move("a|").unwrap(), "[1, -2, 17]");

    // The server closed the first connection; this request fails and drops it.
    assert!(solver.best_move("b|").is_err());

    // A fresh connection is opened for the next one.
    assert_eq!(solver.best_move("c|").unwrap(), "[1, -2, 17]");
}

#[test]
fn tcp_solver_times_out() {
    let rt = Runtime::new().unwrap();
    let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let port = listener.local_addr().unwrap().port();
    // Accept but never answer.
    rt.spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut solver = TcpSolver::connect(rt.handle().clone(), config_for(port, 100)).unwrap();
    let err = solver.best_move("x|").unwrap_err();
    assert!(err.to_string().contains("did not answer"), "{err}");
}

#[test]
fn tcp_solver_connect_fails_without_server() {
    let rt = Runtime::new().unwrap();
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    assert!(TcpSolver::connect(rt.handle().clone(), config_for(port, 500)).is_err());
}
