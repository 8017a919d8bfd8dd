//! Host protocol
//!
//! One JSON request per input line, one JSON response per output line.
//! Requests run concurrently; responses are written as they complete and
//! carry the request `seq`.

use crate::error::ProviderError;
use crate::resource::{Outcome, Provider};
use crate::schema::AttributeMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Fields every request carries besides its operation
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    seq: u64,
    #[serde(default)]
    deadline_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    GetSchema,
    Configure {
        #[serde(default)]
        config: AttributeMap,
    },
    ValidateResource {
        kind: String,
        #[serde(default)]
        config: AttributeMap,
    },
    PlanResource {
        kind: String,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        prior: Option<AttributeMap>,
        #[serde(default)]
        proposed: AttributeMap,
    },
    Create {
        kind: String,
        #[serde(default)]
        planned: AttributeMap,
    },
    Read {
        kind: String,
        id: String,
        #[serde(default)]
        state: AttributeMap,
    },
    Update {
        kind: String,
        id: String,
        #[serde(default)]
        prior: AttributeMap,
        #[serde(default)]
        planned: AttributeMap,
    },
    Delete {
        kind: String,
        id: String,
        #[serde(default)]
        state: AttributeMap,
    },
    Import {
        kind: String,
        id: String,
    },
    ReadDataSource {
        kind: String,
        #[serde(default)]
        config: AttributeMap,
    },
    Stop,
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub seq: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    fn new(seq: u64, outcome: Outcome) -> Self {
        Self {
            seq,
            schema: None,
            outcome,
        }
    }
}

/// Run one operation against `provider`
pub async fn execute(provider: &Provider, op: Operation) -> (Option<Value>, Outcome) {
    let outcome = match op {
        Operation::GetSchema => return (Some(provider.schema_manifest()), Outcome::default()),
        Operation::Configure { config } => provider.configure(config),
        Operation::ValidateResource { kind, config } => provider.validate_resource(&kind, config),
        Operation::PlanResource {
            kind,
            id,
            prior,
            proposed,
        } => {
            let prior = match (id, prior) {
                (Some(id), Some(state)) if !id.is_empty() => Some((id, state)),
                _ => None,
            };
            provider.plan_resource(&kind, prior, proposed)
        }
        Operation::Create { kind, planned } => provider.create(&kind, planned).await,
        Operation::Read { kind, id, state } => provider.read(&kind, &id, state).await,
        Operation::Update {
            kind,
            id,
            prior,
            planned,
        } => provider.update(&kind, &id, prior, planned).await,
        Operation::Delete { kind, id, state } => provider.delete(&kind, &id, state).await,
        Operation::Import { kind, id } => provider.import(&kind, &id).await,
        Operation::ReadDataSource { kind, config } => provider.read_data_source(&kind, config).await,
        Operation::Stop => {
            provider.stop();
            Outcome::default()
        }
    };
    (None, outcome)
}

/// Decode and run one request line
pub async fn handle_line(provider: &Provider, line: &str) -> Response {
    let envelope: Envelope = serde_json::from_str(line).unwrap_or_default();
    let op: Operation = match serde_json::from_str(line) {
        Ok(op) => op,
        Err(err) => {
            error!("Rejecting request {}: {}", envelope.seq, err);
            let err = ProviderError::invalid(format!("malformed request: {err}"));
            return Response::new(envelope.seq, Outcome::failed(err));
        }
    };
    debug!("Request {}: {:?}", envelope.seq, op);

    let run = execute(provider, op);
    let (schema, outcome) = match envelope.deadline_ms {
        Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), run).await {
            Ok(result) => result,
            Err(_) => {
                info!("Request {} exceeded its {}ms deadline", envelope.seq, ms);
                (None, Outcome::failed(ProviderError::Cancelled))
            }
        },
        None => run.await,
    };
    Response {
        seq: envelope.seq,
        schema,
        outcome,
    }
}

/// Serve requests from `input` until it closes
pub async fn serve<R, W>(provider: Arc<Provider>, input: R, output: W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();
    let writer = tokio::spawn(async move {
        let mut output = output;
        while let Some(response) = rx.recv().await {
            let mut line = serde_json::to_vec(&response)?;
            line.push(b'\n');
            output.write_all(&line).await?;
            output.flush().await?;
        }
        Ok::<_, io::Error>(())
    });

    let mut lines = input.lines();
    let mut requests = JoinSet::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let provider = Arc::clone(&provider);
        let tx = tx.clone();
        requests.spawn(async move {
            let response = handle_line(&provider, &line).await;
            // The writer only stops once every sender is gone
            let _ = tx.send(response);
        });
    }
    info!("Input closed; waiting for {} request(s)", requests.len());
    while let Some(joined) = requests.join_next().await {
        if let Err(err) = joined {
            error!("Request task failed: {}", err);
        }
    }
    drop(tx);

    writer.await.map_err(io::Error::other)?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::AsyncReadExt;

    async fn run_session(input: &str) -> HashMap<u64, Value> {
        let (client, server) = tokio::io::duplex(1 << 16);
        let provider = Arc::new(Provider::new());
        let input = input.as_bytes().to_vec();
        let serving = tokio::spawn(async move { serve(provider, input.as_slice(), server).await });

        let mut output = String::new();
        let mut client = client;
        client.read_to_string(&mut output).await.unwrap();
        serving.await.unwrap().unwrap();

        output
            .lines()
            .map(|line| {
                let value: Value = serde_json::from_str(line).unwrap();
                (value["seq"].as_u64().unwrap(), value)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_serves_every_request() {
        let responses = run_session(concat!(
            "{\"seq\":1,\"op\":\"get_schema\"}\n",
            "{\"seq\":2,\"op\":\"validate_resource\",\"kind\":\"oasis_project\",\"config\":{}}\n",
            "\n",
            "{\"seq\":3,\"op\":\"validate_resource\",\"kind\":\"oasis_project\",\"config\":{\"name\":\"p\"}}\n",
        ))
        .await;

        assert_eq!(responses.len(), 3);
        assert!(responses[&1]["schema"]["resources"]["oasis_project"].is_object());
        assert_eq!(responses[&2]["diagnostics"][0]["attribute"], "name");
        assert_eq!(responses[&3]["diagnostics"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_malformed_request() {
        let responses = run_session("{\"seq\":7,\"op\":\"explode\"}\nnot json\n").await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[&7]["diagnostics"][0]["severity"], "error");
        assert!(responses[&0]["diagnostics"][0]["detail"]
            .as_str()
            .unwrap()
            .contains("malformed request"));
    }

    #[tokio::test]
    async fn test_stop_cancels_later_work() {
        let provider = Provider::new();
        let response = handle_line(&provider, "{\"seq\":1,\"op\":\"stop\"}").await;
        assert!(!response.outcome.has_errors());
    }
}
