use calc_core::CalcConfig;
use calc_trigger::{Invocation, InvocationResponse, RequestHandler};

/// Parse a `NAME=VALUE` header argument.
pub fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {s:?}"))?;
    if name.trim().is_empty() {
        return Err(format!("empty header name in {s:?}"));
    }
    Ok((name.trim().to_string(), value.to_string()))
}

pub fn invoke(
    config: &CalcConfig,
    method: &str,
    headers: Vec<(String, String)>,
    body: &str,
) -> anyhow::Result<()> {
    let handler = RequestHandler::from_config(config);
    let invocation = headers
        .into_iter()
        .fold(Invocation::new(method, body), |inv, (k, v)| inv.with_header(k, v));

    let response = handler.handle(&invocation)?;
    print!("{}", render(&response));
    Ok(())
}

fn render(response: &InvocationResponse) -> String {
    let mut headers: Vec<_> = response.headers.iter().collect();
    headers.sort();

    let mut out = format!("status: {}\n", response.status);
    for (name, value) in headers {
        out.push_str(&format!("{name}: {value}\n"));
    }
    out.push('\n');
    out.push_str(&response.body);
    out.push('\n');
    out
}
