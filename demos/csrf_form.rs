use palisade::prelude::*;

fn form_page(field: &str) -> String {
    format!(
        r#"
<!DOCTYPE html>
<html>
<head>
    <title>CSRF Protected Form</title>
</head>
<body>
    <h1>Submit Form</h1>
    <form method="POST" action="/submit">
        {}
        <input type="text" name="username" placeholder="Username" />
        <button type="submit">Submit</button>
    </form>
</body>
</html>
        "#,
        field
    )
}

/// Pull the hidden field's value back out of the rendered page, as a browser would.
fn extract_token(html: &str) -> Option<&str> {
    html.split(r#"value=""#)
        .nth(1)
        .and_then(|rest| rest.split('"').next())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    palisade::log::init()?;

    println!("🔒 Palisade CSRF Protection Example");
    println!("===================================\n");

    let config = CsrfConfig::from_env()?.with_cookie_same_site(SameSite::Lax);
    let header_name = config.header_name.clone();
    let field_name = config.field_name.clone();

    let mut chain = MiddlewareChain::new();
    chain.use_middleware(LoggerMiddleware::new());
    chain.use_middleware(CsrfMiddleware::new(config)?);

    let app = handler(|req: HttpRequest| async move {
        if req.method == Method::GET {
            let field = csrf_html(&req)?;
            return Ok::<_, Error>(HttpResponse::html(form_page(&field)));
        }

        let username = req.form_value("username").await.unwrap_or_default();
        Ok(HttpResponse::text(format!("Saved profile for {}", username)))
    });

    // 1. GET the form: a secret cookie is issued and the page embeds a masked token
    let res = chain.apply(HttpRequest::get("/form"), app.clone()).await?;
    let cookie = res
        .cookies()
        .into_iter()
        .next()
        .ok_or("no CSRF cookie issued")?;
    let page = res.body_text();
    let token = extract_token(&page).ok_or("no token in page")?.to_string();
    println!("GET /form       -> {} (cookie {})", res.status, cookie.name());

    // 2. POST it back with the cookie and the hidden field
    let post = HttpRequest::post("/submit")
        .with_cookie(cookie.name(), cookie.value())
        .with_form(&[("username", "alice"), (field_name.as_str(), token.as_str())]);
    let res = chain.apply(post, app.clone()).await?;
    println!("POST /submit    -> {} {}", res.status, res.body_text());

    // 3. POST from a forged page: the cookie rides along, the token does not
    let forged = HttpRequest::post("/submit")
        .with_cookie(cookie.name(), cookie.value())
        .with_form(&[("username", "mallory")]);
    let res = chain.apply(forged, app.clone()).await?;
    println!("POST (forged)   -> {} {:?}", res.status, res.body_text());

    // 4. Scripts fetch a token and send it in a header instead
    let token_endpoint = handler(|req: HttpRequest| async move {
        let token = csrf_token(&req)?;
        Ok::<_, Error>(HttpResponse::text(token.into_string()))
    });
    let req = HttpRequest::get("/token").with_cookie(cookie.name(), cookie.value());
    let script_token = chain.apply(req, token_endpoint).await?.body_text();

    let xhr = HttpRequest::new(Method::DELETE, "/submit")
        .with_cookie(cookie.name(), cookie.value())
        .with_header(&header_name, &script_token);
    let res = chain.apply(xhr, app).await?;
    println!("DELETE (header) -> {} {}", res.status, res.body_text());

    Ok(())
}
