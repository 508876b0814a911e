use std::time::Duration;

use reqwest::blocking;
use reqwest::blocking::multipart;

use crate::Error;

/// A file part of a multipart request
#[derive(Clone, Debug, PartialEq)]
pub struct FilePart {
    pub name: String,
    pub filename: String,
    pub data: Vec<u8>,
}

/// Body of a POST request. Exactly one encoding per request.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    Form(Vec<(String, String)>),
    Multipart {
        files: Vec<FilePart>,
        fields: Vec<(String, String)>,
    },
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart { .. })
    }
}

/// Minimal HTTP client needed by the submitter.
///
/// Implementations return the full response body. Anything that prevents
/// getting one (connection errors, timeouts, error statuses) must be
/// reported as a transport error.
pub trait HttpClient {
    fn post(&self, url: &str, body: RequestBody) -> Result<Vec<u8>, Error>;
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn post(&self, url: &str, body: RequestBody) -> Result<Vec<u8>, Error> {
        (**self).post(url, body)
    }
}

/// Blocking reqwest-backed client
pub struct ReqwestClient {
    client: blocking::Client,
}

impl ReqwestClient {
    pub fn new(client: blocking::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: u64) -> Result<Self, Error> {
        let client = blocking::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;
        Ok(Self::new(client))
    }

    #[inline]
    fn build_request(&self, url: &str, body: RequestBody) -> Result<blocking::Request, Error> {
        let req = self.client.post(reqwest::Url::parse(url)?);

        let req = match body {
            RequestBody::Form(fields) => req.form(&fields),
            RequestBody::Multipart { files, fields } => req.multipart(build_multipart(files, fields)),
        };

        Ok(req.build()?)
    }
}

impl HttpClient for ReqwestClient {
    fn post(&self, url: &str, body: RequestBody) -> Result<Vec<u8>, Error> {
        let req = self.build_request(url, body)?;
        let resp = self.client.execute(req)?.error_for_status()?;

        Ok(resp.bytes()?.to_vec())
    }
}

/// File parts first, then one text field per payload entry
fn build_multipart(files: Vec<FilePart>, fields: Vec<(String, String)>) -> multipart::Form {
    let mut form = multipart::Form::new();

    for file in files {
        let part = multipart::Part::bytes(file.data).file_name(file.filename);
        form = form.part(file.name, part);
    }

    for (name, value) in fields {
        form = form.text(name, value);
    }

    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::CONTENT_TYPE;

    const URL: &str = "https://api.elasticemail.com/v2/email/send";

    fn fields() -> Vec<(String, String)> {
        vec![
            ("msgTo".to_string(), "a@x.com,b@x.com".to_string()),
            ("subject".to_string(), "Hi there".to_string()),
        ]
    }

    #[test]
    fn form_body_is_urlencoded() {
        let client = ReqwestClient::new(blocking::Client::new());
        let req = client.build_request(URL, RequestBody::Form(fields())).unwrap();

        assert_eq!(req.method(), reqwest::Method::POST);
        assert_eq!(req.url().as_str(), URL);
        assert_eq!(
            req.headers()[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );

        let body = req.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, b"msgTo=a%40x.com%2Cb%40x.com&subject=Hi+there");
    }

    #[test]
    fn multipart_body_has_boundary() {
        let client = ReqwestClient::new(blocking::Client::new());
        let body = RequestBody::Multipart {
            files: vec![FilePart {
                name: "file_0".to_string(),
                filename: "hello.txt".to_string(),
                data: b"hello".to_vec(),
            }],
            fields: fields(),
        };
        assert!(body.is_multipart());

        let req = client.build_request(URL, body).unwrap();
        let content_type = req.headers()[CONTENT_TYPE].to_str().unwrap();

        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[test]
    fn bad_url_is_transport_error() {
        let client = ReqwestClient::new(blocking::Client::new());
        let err = client
            .build_request("not a url", RequestBody::Form(fields()))
            .unwrap_err();

        assert!(err.is_transport());
    }
}
