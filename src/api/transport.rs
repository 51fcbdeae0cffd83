//! Purpose: Provide the remote-call seam between the binding and the wire.
//! Exports: `Transport`, `XmlRpcTransport`, `SERVICE_URL`.
//! Role: Issue one XML-RPC request per call; no retries, no timeouts of its own.
//! Invariants: Remote faults map to `ErrorKind::Fault`, transport failures to `ErrorKind::Io`.
//! Invariants: Constructing a transport performs no network activity.
#![allow(clippy::result_large_err)]

use crate::core::error::{Error, ErrorKind};
use std::error::Error as StdError;
use std::io::{Cursor, Read};
use url::Url;
use xmlrpc::Value;

type ApiResult<T> = Result<T, Error>;

/// Default endpoint of the public LodgeIt service.
pub const SERVICE_URL: &str = "http://paste.pocoo.org/xmlrpc/";

/// Request/response remote-call mechanism: a procedure name plus positional
/// arguments in, a loosely-typed value out.
pub trait Transport: Send + Sync {
    fn call(&self, method: &str, args: Vec<Value>) -> ApiResult<Value>;
}

pub struct XmlRpcTransport {
    endpoint: Url,
    agent: ureq::Agent,
}

impl XmlRpcTransport {
    pub fn new(endpoint: impl Into<String>) -> ApiResult<Self> {
        let endpoint = parse_endpoint(endpoint.into())?;
        let agent = ureq::AgentBuilder::new().build();
        Ok(Self { endpoint, agent })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Transport for XmlRpcTransport {
    fn call(&self, method: &str, args: Vec<Value>) -> ApiResult<Value> {
        let mut request = xmlrpc::Request::new(method);
        for arg in args {
            request = request.arg(arg);
        }
        tracing::debug!(method, "issuing xml-rpc call");
        request
            .call(HttpPost {
                agent: &self.agent,
                url: &self.endpoint,
            })
            .map_err(|err| wire_error(method, err))
    }
}

struct HttpPost<'a> {
    agent: &'a ureq::Agent,
    url: &'a Url,
}

impl xmlrpc::Transport for HttpPost<'_> {
    type Stream = Cursor<Vec<u8>>;

    fn transmit(
        self,
        request: &xmlrpc::Request<'_>,
    ) -> Result<Self::Stream, Box<dyn StdError + Send + Sync>> {
        let mut body = Vec::new();
        request.write_as_xml(&mut body)?;
        let response = self
            .agent
            .post(self.url.as_str())
            .set("Content-Type", "text/xml; charset=utf-8")
            .send_bytes(&body)?;
        let mut buffered = Vec::new();
        response.into_reader().read_to_end(&mut buffered)?;
        Ok(Cursor::new(buffered))
    }
}

fn parse_endpoint(raw: String) -> ApiResult<Url> {
    let url = Url::parse(&raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid service endpoint url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("service endpoint must use http or https scheme"));
    }
    Ok(url)
}

fn wire_error(method: &str, err: xmlrpc::Error) -> Error {
    match err.fault() {
        Some(fault) => Error::new(ErrorKind::Fault)
            .with_message(fault.fault_string.clone())
            .with_fault_code(fault.fault_code)
            .with_method(method),
        None => Error::new(ErrorKind::Io)
            .with_message("xml-rpc request failed")
            .with_method(method)
            .with_source(err),
    }
}
