
use serde_json::{json, Value};
use test_startup::*;

async fn register_and_login(app: &TestApp, email: &str) -> String {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/auth/register", app.address.as_str()))
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": "password1",
            "confirmPassword": "password1",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 201);
    let body = res
        .json::<Value>()
        .await
        .expect("Failed to parse response body");
    body["token"].as_str().unwrap().to_string()
}

fn movie_payload(title: &str, duration: i32) -> Value {
    json!({
        "title": title,
        "originalTitle": format!("{} (original)", title),
        "releaseDate": "1999-03-31",
        "description": "A test movie",
        "duration": duration,
    })
}

async fn create_movie(app: &TestApp, token: &str, payload: &Value) -> Value {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/movies", app.address.as_str()))
        .bearer_auth(token)
        .json(payload)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 201);
    res.json::<Value>()
        .await
        .expect("Failed to parse response body")
}

async fn list_movies(app: &TestApp, token: &str, query: &str) -> Value {
    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/movies{}", app.address.as_str(), query))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to execute request");
    assert!(res.status().is_success());
    res.json::<Value>()
        .await
        .expect("Failed to parse response body")
}

#[actix_rt::test]
async fn movie_routes_require_a_bearer_token() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let without_token = client
        .get(format!("{}/movies", app.address.as_str()))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(without_token.status().as_u16(), 401);

    let with_garbage_token = client
        .get(format!("{}/movies", app.address.as_str()))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(with_garbage_token.status().as_u16(), 401);
}

#[actix_rt::test]
async fn create_movie_computes_profit_and_release_status() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;

    let mut payload = movie_payload("Heist", 120);
    payload["budget"] = json!(1_000_000);
    payload["revenue"] = json!(2_500_000);
    let movie = create_movie(&app, &token, &payload).await;

    assert_eq!(movie["profit"], json!(1_500_000));
    assert_eq!(movie["status"], "Released");
    assert_eq!(movie["user"]["email"], "owner@example.com");
}

#[actix_rt::test]
async fn future_release_date_reads_as_upcoming() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;

    let mut payload = movie_payload("From The Future", 95);
    payload["releaseDate"] = json!("2999-01-01");
    let movie = create_movie(&app, &token, &payload).await;

    assert_eq!(movie["status"], "Upcoming");
    assert_eq!(movie["profit"], Value::Null);
}

#[actix_rt::test]
async fn create_movie_rejects_out_of_range_fields() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;
    let client = reqwest::Client::new();

    let mut zero_duration = movie_payload("Bad", 0);
    let mut long_duration = movie_payload("Bad", 601);
    let mut high_score = movie_payload("Bad", 100);
    high_score["score"] = json!(10.5);
    let mut unknown_rating = movie_payload("Bad", 100);
    unknown_rating["rating"] = json!("PG-13");
    zero_duration["title"] = json!("Bad");
    long_duration["title"] = json!("Bad");

    for payload in [zero_duration, long_duration, high_score, unknown_rating] {
        let res = client
            .post(format!("{}/movies", app.address.as_str()))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(res.status().as_u16(), 400);
    }
}

#[actix_rt::test]
async fn duration_filter_bounds_are_inclusive() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;

    for (title, duration) in [("A", 80), ("B", 90), ("C", 120), ("D", 150)] {
        create_movie(&app, &token, &movie_payload(title, duration)).await;
    }

    let body = list_movies(&app, &token, "?minDuration=90&maxDuration=120").await;
    let movies = body["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 2);
    for movie in movies {
        let duration = movie["duration"].as_i64().unwrap();
        assert!((90..=120).contains(&duration));
    }
}

#[actix_rt::test]
async fn search_matches_title_or_original_title_case_insensitively() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;

    create_movie(&app, &token, &movie_payload("The Matrix", 136)).await;
    let mut translated = movie_payload("A Origem", 148);
    translated["originalTitle"] = json!("Inception");
    create_movie(&app, &token, &translated).await;
    create_movie(&app, &token, &movie_payload("Unrelated", 100)).await;

    let by_title = list_movies(&app, &token, "?search=matrix").await;
    assert_eq!(by_title["movies"].as_array().unwrap().len(), 1);
    assert_eq!(by_title["movies"][0]["title"], "The Matrix");

    let by_original_title = list_movies(&app, &token, "?search=INCEPTION").await;
    assert_eq!(by_original_title["movies"].as_array().unwrap().len(), 1);
    assert_eq!(by_original_title["movies"][0]["title"], "A Origem");
}

#[actix_rt::test]
async fn genre_filter_matches_substring_case_insensitively() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;

    let mut scifi = movie_payload("Blade Runner", 117);
    scifi["genre"] = json!("Science Fiction");
    create_movie(&app, &token, &scifi).await;
    let mut drama = movie_payload("Ordinary People", 124);
    drama["genre"] = json!("Drama");
    create_movie(&app, &token, &drama).await;

    let body = list_movies(&app, &token, "?genre=fiction").await;
    let movies = body["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["title"], "Blade Runner");
}

#[actix_rt::test]
async fn release_date_filter_bounds_are_inclusive() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;

    for (title, date) in [
        ("Nineties", "1995-06-01"),
        ("Millennium", "2000-01-01"),
        ("Modern", "2015-09-20"),
    ] {
        let mut payload = movie_payload(title, 100);
        payload["releaseDate"] = json!(date);
        create_movie(&app, &token, &payload).await;
    }

    let body = list_movies(&app, &token, "?startDate=2000-01-01&endDate=2015-09-20").await;
    let titles: Vec<&str> = body["movies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|movie| movie["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Millennium"));
    assert!(titles.contains(&"Modern"));
}

#[actix_rt::test]
async fn pagination_reports_ceiling_of_total_over_limit() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;

    for i in 0..5 {
        create_movie(&app, &token, &movie_payload(&format!("Movie {}", i), 100)).await;
    }

    let first_page = list_movies(&app, &token, "?page=1&limit=2").await;
    assert_eq!(first_page["movies"].as_array().unwrap().len(), 2);
    assert_eq!(first_page["pagination"]["total"], json!(5));
    assert_eq!(first_page["pagination"]["pages"], json!(3));
    assert_eq!(first_page["pagination"]["limit"], json!(2));

    let last_page = list_movies(&app, &token, "?page=3&limit=2").await;
    assert_eq!(last_page["movies"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn listing_orders_by_creation_time_descending() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;

    create_movie(&app, &token, &movie_payload("First", 100)).await;
    create_movie(&app, &token, &movie_payload("Second", 100)).await;
    create_movie(&app, &token, &movie_payload("Third", 100)).await;

    let body = list_movies(&app, &token, "").await;
    let titles: Vec<&str> = body["movies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|movie| movie["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Third", "Second", "First"]);
}

#[actix_rt::test]
async fn non_owner_cannot_read_update_or_delete() {
    let app = spawn_app().await;
    let owner_token = register_and_login(&app, "owner@example.com").await;
    let intruder_token = register_and_login(&app, "intruder@example.com").await;
    let client = reqwest::Client::new();

    let movie = create_movie(&app, &owner_token, &movie_payload("Private", 100)).await;
    let movie_url = format!("{}/movies/{}", app.address.as_str(), movie["id"].as_str().unwrap());

    let read = client
        .get(movie_url.as_str())
        .bearer_auth(&intruder_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(read.status().as_u16(), 403);

    let update = client
        .patch(movie_url.as_str())
        .bearer_auth(&intruder_token)
        .json(&json!({"title": "Hijacked"}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(update.status().as_u16(), 403);

    let delete = client
        .delete(movie_url.as_str())
        .bearer_auth(&intruder_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(delete.status().as_u16(), 403);

    // The same requests succeed for the owner.
    let owner_read = client
        .get(movie_url.as_str())
        .bearer_auth(&owner_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert!(owner_read.status().is_success());
    let owner_body = owner_read
        .json::<Value>()
        .await
        .expect("Failed to parse response body");
    assert_eq!(owner_body["title"], "Private");
}

#[actix_rt::test]
async fn missing_movie_returns_not_found() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/movies/{}",
            app.address.as_str(),
            uuid::Uuid::new_v4()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(res.status().as_u16(), 404);
}

#[actix_rt::test]
async fn partial_update_leaves_other_fields_alone() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;
    let client = reqwest::Client::new();

    let mut payload = movie_payload("Original Cut", 100);
    payload["budget"] = json!(1_000_000);
    let movie = create_movie(&app, &token, &payload).await;

    let res = client
        .patch(format!(
            "{}/movies/{}",
            app.address.as_str(),
            movie["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .json(&json!({"title": "Director's Cut", "revenue": 4_000_000}))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(res.status().is_success());
    let updated = res
        .json::<Value>()
        .await
        .expect("Failed to parse response body");

    assert_eq!(updated["title"], "Director's Cut");
    assert_eq!(updated["description"], "A test movie");
    assert_eq!(updated["duration"], json!(100));
    assert_eq!(updated["profit"], json!(3_000_000));
}

#[actix_rt::test]
async fn update_ignores_attempts_to_change_the_owner() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;
    let client = reqwest::Client::new();

    let movie = create_movie(&app, &token, &movie_payload("Mine", 100)).await;
    let owner_id = movie["userId"].as_str().unwrap().to_string();

    let res = client
        .patch(format!(
            "{}/movies/{}",
            app.address.as_str(),
            movie["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Still Mine",
            "userId": uuid::Uuid::new_v4(),
            "deletedAt": "2020-01-01T00:00:00Z",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(res.status().is_success());
    let updated = res
        .json::<Value>()
        .await
        .expect("Failed to parse response body");

    assert_eq!(updated["userId"].as_str().unwrap(), owner_id);
    assert_eq!(updated["deletedAt"], Value::Null);
}

#[actix_rt::test]
async fn soft_deleted_movies_disappear_from_every_path() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;
    let client = reqwest::Client::new();

    let movie = create_movie(&app, &token, &movie_payload("Ephemeral", 100)).await;
    let movie_url = format!("{}/movies/{}", app.address.as_str(), movie["id"].as_str().unwrap());

    let delete = client
        .delete(movie_url.as_str())
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert!(delete.status().is_success());
    let delete_body = delete
        .json::<Value>()
        .await
        .expect("Failed to parse response body");
    assert_eq!(delete_body["message"], "Movie deleted successfully");
    assert!(delete_body["deletedAt"].is_string());

    let read = client
        .get(movie_url.as_str())
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(read.status().as_u16(), 404);

    let listing = list_movies(&app, &token, "").await;
    assert_eq!(listing["movies"].as_array().unwrap().len(), 0);
    assert_eq!(listing["pagination"]["total"], json!(0));

    let update = client
        .patch(movie_url.as_str())
        .bearer_auth(&token)
        .json(&json!({"title": "Resurrected"}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(update.status().as_u16(), 404);
}

#[actix_rt::test]
async fn delete_twice_returns_not_found() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;
    let client = reqwest::Client::new();

    let movie = create_movie(&app, &token, &movie_payload("Once", 100)).await;
    let movie_url = format!("{}/movies/{}", app.address.as_str(), movie["id"].as_str().unwrap());

    let first = client
        .delete(movie_url.as_str())
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert!(first.status().is_success());

    let second = client
        .delete(movie_url.as_str())
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(second.status().as_u16(), 404);
}

#[actix_rt::test]
async fn poster_keys_are_served_as_signed_urls() {
    let app = spawn_app().await;
    let token = register_and_login(&app, "owner@example.com").await;
    let client = reqwest::Client::new();

    let key = "0a1b2c3d-poster.png";
    let mut payload = movie_payload("With Poster", 100);
    payload["posterUrl"] = json!(key);
    let movie = create_movie(&app, &token, &payload).await;

    let signed = movie["posterUrl"].as_str().unwrap();
    assert_ne!(signed, key);
    assert!(signed.contains(key));
    assert!(signed.contains("X-Amz-"));

    // The stored value stays the raw key, signing happens on every read.
    let read = client
        .get(format!(
            "{}/movies/{}",
            app.address.as_str(),
            movie["id"].as_str().unwrap()
        ))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    let read_body = read
        .json::<Value>()
        .await
        .expect("Failed to parse response body");
    let re_signed = read_body["posterUrl"].as_str().unwrap();
    assert_ne!(re_signed, key);
    assert!(re_signed.contains(key));
}
