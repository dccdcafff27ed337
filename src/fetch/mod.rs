mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::Url;
use reqwest::multipart::Form;

/// Builds a multipart POST of text fields and sends it through `client`.
pub async fn post_multipart<C: HttpClient>(
    client: &C,
    url: Url,
    fields: Vec<(&'static str, String)>,
) -> reqwest::Result<reqwest::Response> {
    let form = fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));

    let req = client.post(url).multipart(form).build()?;

    client.execute(req).await
}
