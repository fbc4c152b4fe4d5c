use axum::{extract::Query, response::Html};

use crate::models::FlashQuery;

fn flash_html(query: Option<Query<FlashQuery>>) -> String {
    query
        .and_then(|Query(q)| q.flash)
        .map(|flash| format!("<p class=\"flash\">{}</p>\n", flash.message()))
        .unwrap_or_default()
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  <title>{} - GenoSense</title>\n</head>\n<body>\n<h1>{}</h1>\n{}</body>\n</html>\n",
        title, title, body
    ))
}

pub async fn index(query: Option<Query<FlashQuery>>) -> Html<String> {
    let body = format!(
        "{}<p>Ganoderma infection monitoring for palm oil plantations.</p>\n\
         <ul>\n\
         <li><a href=\"/upload\">Upload plantation imagery</a></li>\n\
         <li><a href=\"/api/infection_data\">Infection points</a></li>\n\
         <li><a href=\"/api/trend_data\">Daily trend</a></li>\n\
         <li><a href=\"/api/model_info\">Models</a></li>\n\
         <li><a href=\"/about\">About</a></li>\n\
         </ul>\n",
        flash_html(query)
    );
    page("Infection Map", &body)
}

pub async fn about() -> Html<String> {
    page(
        "About",
        "<p>Basal stem rot, caused by the fungus <em>Ganoderma boninense</em>, is the most \
         damaging disease of oil palm in Southeast Asia. Infected palms show little above \
         ground until the trunk is badly decayed, so early detection relies on imagery.</p>\n\
         <p>Uploaded multispectral and RGB images are segmented with a UNet model and \
         classified with an artificial neural network; each detection becomes a geotagged \
         infection point with a severity between 0 and 1.</p>\n\
         <p>Spread forecasts grow existing severities over time and seed new infections \
         around known ones, with the spread radius widening as the horizon lengthens.</p>\n",
    )
}

pub async fn upload_form(query: Option<Query<FlashQuery>>) -> Html<String> {
    let body = format!(
        "{}<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" accept=\".png,.jpg,.jpeg,.tif,.tiff\">\n\
         <button type=\"submit\">Upload</button>\n\
         </form>\n",
        flash_html(query)
    );
    page("Upload Imagery", &body)
}
