use serde_json::json;
use uuid::Uuid;

use blog_server::utils::jwt;

use crate::common::{INITIAL_BLOGS, TEST_SECRET, TestApp, routes};

mod listing {
    use super::*;

    #[tokio::test]
    async fn blogs_are_returned_as_json() {
        let app = TestApp::spawn().await;
        app.seed_blogs().await;

        let res = app.get_without_token(routes::BLOGS).await;

        assert_eq!(res.status, 200);
        assert!(
            res.content_type
                .as_deref()
                .is_some_and(|ct| ct.starts_with("application/json")),
            "unexpected content type: {:?}",
            res.content_type
        );
        assert_eq!(res.body.as_array().unwrap().len(), INITIAL_BLOGS.len());
    }

    #[tokio::test]
    async fn unique_identifier_is_named_id() {
        let app = TestApp::spawn().await;
        let ids = app.seed_blogs().await;

        let res = app.get_without_token(routes::BLOGS).await;

        let first = &res.body[0];
        assert_eq!(first["id"], ids[0].to_string());
        assert!(first.get("_id").is_none());
    }

    #[tokio::test]
    async fn empty_collection_is_an_empty_array() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::BLOGS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!([]));
    }

    #[tokio::test]
    async fn blogs_without_owner_have_null_user() {
        let app = TestApp::spawn().await;
        app.seed_blogs().await;

        let res = app.get_without_token(routes::BLOGS).await;

        assert!(res.body[0]["user"].is_null());
        assert_eq!(res.body[0]["url"], "blog1.com");
        assert_eq!(res.body[1]["likes"], 5);
    }

    #[tokio::test]
    async fn owner_is_expanded_to_username_and_name() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;
        let user_id = app.user_id("mluukkai").await;
        app.create_blog(&token, "blog 3").await;

        let res = app.get_without_token(routes::BLOGS).await;

        let owner = &res.body[0]["user"];
        assert_eq!(owner["id"], user_id.to_string());
        assert_eq!(owner["username"], "mluukkai");
        assert_eq!(owner["name"], "mluukkai name");
        assert!(owner.get("password_hash").is_none());
        assert!(owner.get("blogs").is_none());
    }
}

mod viewing {
    use super::*;

    #[tokio::test]
    async fn existing_blog_is_returned_with_owner_expanded() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;
        let id = app.create_blog(&token, "blog 3").await;

        let res = app.get_without_token(&routes::blog(&id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], id);
        assert_eq!(res.body["title"], "blog 3");
        assert_eq!(res.body["user"]["username"], "mluukkai");
    }

    #[tokio::test]
    async fn absent_blog_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .get_without_token(&routes::blog(&Uuid::now_v7().to_string()))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_id_is_a_bad_request() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::blog("5a3d5da59070081a82a3445")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "MALFORMED_ID");
        assert_eq!(res.body["error"], "malformatted id");
    }
}

mod creation {
    use super::*;

    #[tokio::test]
    async fn succeeds_with_valid_data_and_token() {
        let app = TestApp::spawn().await;
        app.seed_blogs().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;
        let user_id = app.user_id("mluukkai").await;

        let res = app
            .post_with_token(
                routes::BLOGS,
                &json!({
                    "title": "blog 3",
                    "author": "author 3",
                    "url": "blog3.com",
                    "likes": 1,
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.content_type.unwrap().starts_with("application/json"));
        assert_eq!(res.body["user"], user_id.to_string());
        assert_eq!(res.body["comments"], json!([]));

        let list = app.get_without_token(routes::BLOGS).await;
        let blogs = list.body.as_array().unwrap();
        assert_eq!(blogs.len(), INITIAL_BLOGS.len() + 1);
        assert!(blogs.iter().any(|b| b["title"] == "blog 3"));
    }

    #[tokio::test]
    async fn created_blog_reads_back_with_the_same_fields() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;

        let id = app.create_blog(&token, "round trip").await;
        let res = app.get_without_token(&routes::blog(&id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "round trip");
        assert_eq!(res.body["author"], "author 3");
        assert_eq!(res.body["url"], "blog3.com");
        assert_eq!(res.body["likes"], 1);
    }

    #[tokio::test]
    async fn text_fields_are_stored_as_sent() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;

        let created = app
            .post_with_token(
                routes::BLOGS,
                &json!({"title": "  spaced  ", "author": " a ", "url": " spaced.com"}),
                &token,
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);

        let res = app.get_without_token(&routes::blog(&created.id())).await;
        assert_eq!(res.body["title"], "  spaced  ");
        assert_eq!(res.body["author"], " a ");
        assert_eq!(res.body["url"], " spaced.com");
    }

    #[tokio::test]
    async fn likes_default_to_zero() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;

        let res = app
            .post_with_token(
                routes::BLOGS,
                &json!({"title": "no likes", "author": "a", "url": "nolikes.com"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["likes"], 0);
    }

    #[tokio::test]
    async fn created_blog_is_listed_under_its_owner() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;
        let id = app.create_blog(&token, "blog 3").await;

        let res = app.get_without_token(routes::USERS).await;

        let user = &res.body[0];
        assert_eq!(user["username"], "mluukkai");
        assert_eq!(user["blogs"][0]["id"], id);
        assert_eq!(user["blogs"][0]["title"], "blog 3");
    }

    #[tokio::test]
    async fn fails_with_401_without_token() {
        let app = TestApp::spawn().await;
        app.seed_blogs().await;

        let res = app
            .post_without_token(
                routes::BLOGS,
                &json!({"title": "blog 3", "author": "a", "url": "blog3.com"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["error"], "token invalid");
        assert_eq!(app.blogs_in_db().await.len(), INITIAL_BLOGS.len());
    }

    #[tokio::test]
    async fn fails_with_401_for_garbage_token() {
        let app = TestApp::spawn().await;

        let res = app
            .post_with_token(
                routes::BLOGS,
                &json!({"title": "blog 3", "url": "blog3.com"}),
                "not-a-token",
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["error"], "token invalid");
        assert!(app.blogs_in_db().await.is_empty());
    }

    #[tokio::test]
    async fn fails_with_401_for_non_bearer_scheme() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;

        let res = app
            .post_with_header(
                routes::BLOGS,
                &json!({"title": "blog 3", "url": "blog3.com"}),
                &format!("Token {token}"),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["error"], "token invalid");
    }

    #[tokio::test]
    async fn fails_with_401_for_token_signed_with_another_secret() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("mluukkai", "salainen123").await;
        let user_id = app.user_id("mluukkai").await;
        let forged = jwt::sign(user_id, "mluukkai", "some-other-secret", 3600).unwrap();

        let res = app
            .post_with_token(
                routes::BLOGS,
                &json!({"title": "blog 3", "url": "blog3.com"}),
                &forged,
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn fails_with_401_for_expired_token() {
        let app = TestApp::spawn().await;
        app.create_authenticated_user("mluukkai", "salainen123").await;
        let user_id = app.user_id("mluukkai").await;
        let expired = jwt::sign(user_id, "mluukkai", TEST_SECRET, -3600).unwrap();

        let res = app
            .post_with_token(
                routes::BLOGS,
                &json!({"title": "blog 3", "url": "blog3.com"}),
                &expired,
            )
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn fails_with_401_when_token_subject_has_no_user() {
        let app = TestApp::spawn().await;
        let orphan = jwt::sign(Uuid::now_v7(), "ghost", TEST_SECRET, 3600).unwrap();

        let res = app
            .post_with_token(
                routes::BLOGS,
                &json!({"title": "blog 3", "url": "blog3.com"}),
                &orphan,
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["error"], "token invalid");
        assert!(app.blogs_in_db().await.is_empty());
    }

    #[tokio::test]
    async fn fails_with_400_if_url_missing() {
        let app = TestApp::spawn().await;
        app.seed_blogs().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;

        let res = app
            .post_with_token(routes::BLOGS, &json!({"title": "blog 4"}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let list = app.get_without_token(routes::BLOGS).await;
        assert_eq!(list.body.as_array().unwrap().len(), INITIAL_BLOGS.len());
    }

    #[tokio::test]
    async fn fails_with_400_if_title_missing() {
        let app = TestApp::spawn().await;
        app.seed_blogs().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;

        let res = app
            .post_with_token(
                routes::BLOGS,
                &json!({"author": "author 4", "url": "blog4.com"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.blogs_in_db().await.len(), INITIAL_BLOGS.len());
    }

    #[tokio::test]
    async fn fails_with_400_for_malformed_json() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;

        let res = app
            .post_with_token(routes::BLOGS, &json!({"title": 42, "url": "x"}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn succeeds_with_204_if_id_is_valid() {
        let app = TestApp::spawn().await;
        let ids = app.seed_blogs().await;

        let res = app.delete_without_token(&routes::blog(&ids[0].to_string())).await;

        assert_eq!(res.status, 204);
        let remaining = app.blogs_in_db().await;
        assert_eq!(remaining.len(), INITIAL_BLOGS.len() - 1);
        assert!(remaining.iter().all(|b| b.id != ids[0]));
    }

    #[tokio::test]
    async fn absent_blog_still_returns_204() {
        let app = TestApp::spawn().await;
        app.seed_blogs().await;

        let res = app
            .delete_without_token(&routes::blog(&Uuid::now_v7().to_string()))
            .await;

        assert_eq!(res.status, 204);
        assert_eq!(app.blogs_in_db().await.len(), INITIAL_BLOGS.len());
    }

    #[tokio::test]
    async fn repeated_delete_is_a_no_op() {
        let app = TestApp::spawn().await;
        let ids = app.seed_blogs().await;
        let path = routes::blog(&ids[1].to_string());

        assert_eq!(app.delete_without_token(&path).await.status, 204);
        assert_eq!(app.delete_without_token(&path).await.status, 204);
        assert_eq!(app.blogs_in_db().await.len(), INITIAL_BLOGS.len() - 1);
    }

    #[tokio::test]
    async fn malformed_id_is_a_bad_request() {
        let app = TestApp::spawn().await;

        let res = app.delete_without_token(&routes::blog("nope")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "MALFORMED_ID");
    }
}

mod modification {
    use super::*;

    #[tokio::test]
    async fn likes_are_updated_and_other_fields_kept() {
        let app = TestApp::spawn().await;
        let ids = app.seed_blogs().await;
        let path = routes::blog(&ids[0].to_string());

        let res = app.put_without_token(&path, &json!({"likes": 100})).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["likes"], 100);

        let list = app.get_without_token(routes::BLOGS).await;
        assert_eq!(list.body[0]["likes"], 100);

        let blog = app.get_without_token(&path).await;
        assert_eq!(blog.body["likes"], 100);
        assert_eq!(blog.body["title"], "blog 1");
        assert_eq!(blog.body["author"], "author 1");
        assert_eq!(blog.body["url"], "blog1.com");
    }

    #[tokio::test]
    async fn full_replacement_updates_every_field() {
        let app = TestApp::spawn().await;
        let ids = app.seed_blogs().await;

        let res = app
            .put_without_token(
                &routes::blog(&ids[1].to_string()),
                &json!({
                    "title": "renamed",
                    "author": null,
                    "url": "renamed.com",
                    "likes": 7,
                    "comments": ["first"],
                }),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "renamed");
        assert!(res.body["author"].is_null());
        assert_eq!(res.body["url"], "renamed.com");
        assert_eq!(res.body["likes"], 7);
        assert_eq!(res.body["comments"], json!(["first"]));
    }

    #[tokio::test]
    async fn owner_cannot_be_reassigned() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;
        let owner_id = app.user_id("mluukkai").await;
        let id = app.create_blog(&token, "blog 3").await;

        let res = app
            .put_without_token(
                &routes::blog(&id),
                &json!({"likes": 2, "user": Uuid::now_v7().to_string()}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["user"], owner_id.to_string());
    }

    #[tokio::test]
    async fn empty_payload_returns_blog_unchanged() {
        let app = TestApp::spawn().await;
        let ids = app.seed_blogs().await;

        let res = app
            .put_without_token(&routes::blog(&ids[0].to_string()), &json!({}))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["likes"], 3);
    }

    #[tokio::test]
    async fn invalid_fields_are_rejected() {
        let app = TestApp::spawn().await;
        let ids = app.seed_blogs().await;
        let path = routes::blog(&ids[0].to_string());

        let blank = app.put_without_token(&path, &json!({"title": "  "})).await;
        assert_eq!(blank.status, 400);

        let negative = app.put_without_token(&path, &json!({"likes": -1})).await;
        assert_eq!(negative.status, 400);

        let blog = app.get_without_token(&path).await;
        assert_eq!(blog.body["title"], "blog 1");
        assert_eq!(blog.body["likes"], 3);
    }

    #[tokio::test]
    async fn absent_blog_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .put_without_token(
                &routes::blog(&Uuid::now_v7().to_string()),
                &json!({"likes": 100}),
            )
            .await;

        assert_eq!(res.status, 404);
    }
}

mod comments {
    use super::*;

    #[tokio::test]
    async fn comments_are_replaced_wholesale() {
        let app = TestApp::spawn().await;
        let ids = app.seed_blogs().await;
        let path = routes::blog_comments(&ids[0].to_string());

        let first = app
            .post_without_token(&path, &json!({"comments": ["nice", "very nice"]}))
            .await;
        assert_eq!(first.status, 201, "{}", first.text);
        assert_eq!(first.body["comments"], json!(["nice", "very nice"]));

        let second = app
            .post_without_token(&path, &json!({"comments": ["only this"]}))
            .await;
        assert_eq!(second.status, 201);
        assert_eq!(second.body["comments"], json!(["only this"]));

        let blog = app.get_without_token(&routes::blog(&ids[0].to_string())).await;
        assert_eq!(blog.body["comments"], json!(["only this"]));
        assert_eq!(blog.body["likes"], 3);
    }

    #[tokio::test]
    async fn missing_comments_field_is_rejected() {
        let app = TestApp::spawn().await;
        let ids = app.seed_blogs().await;

        let res = app
            .post_without_token(&routes::blog_comments(&ids[0].to_string()), &json!({}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn absent_blog_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                &routes::blog_comments(&Uuid::now_v7().to_string()),
                &json!({"comments": ["x"]}),
            )
            .await;

        assert_eq!(res.status, 404);
    }
}

mod ownership {
    use super::*;

    async fn spawn_enforcing() -> TestApp {
        TestApp::spawn_with(|config| config.auth.enforce_ownership = true).await
    }

    #[tokio::test]
    async fn update_without_token_is_unauthorized() {
        let app = spawn_enforcing().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;
        let id = app.create_blog(&token, "blog 3").await;

        let res = app.put_without_token(&routes::blog(&id), &json!({"likes": 9})).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["error"], "token invalid");
    }

    #[tokio::test]
    async fn only_the_owner_can_update() {
        let app = spawn_enforcing().await;
        let owner = app.create_authenticated_user("mluukkai", "salainen123").await;
        let other = app.create_authenticated_user("hellas", "salainen456").await;
        let id = app.create_blog(&owner, "blog 3").await;

        let denied = app
            .put_with_token(&routes::blog(&id), &json!({"likes": 9}), &other)
            .await;
        assert_eq!(denied.status, 403);
        assert_eq!(denied.body["code"], "PERMISSION_DENIED");

        let allowed = app
            .put_with_token(&routes::blog(&id), &json!({"likes": 9}), &owner)
            .await;
        assert_eq!(allowed.status, 200);
        assert_eq!(allowed.body["likes"], 9);
    }

    #[tokio::test]
    async fn only_the_owner_can_delete() {
        let app = spawn_enforcing().await;
        let owner = app.create_authenticated_user("mluukkai", "salainen123").await;
        let other = app.create_authenticated_user("hellas", "salainen456").await;
        let id = app.create_blog(&owner, "blog 3").await;

        let denied = app.delete_with_token(&routes::blog(&id), &other).await;
        assert_eq!(denied.status, 403);
        assert_eq!(app.blogs_in_db().await.len(), 1);

        let allowed = app.delete_with_token(&routes::blog(&id), &owner).await;
        assert_eq!(allowed.status, 204);
        assert!(app.blogs_in_db().await.is_empty());
    }

    #[tokio::test]
    async fn ownerless_blogs_cannot_be_commented_on() {
        let app = spawn_enforcing().await;
        let ids = app.seed_blogs().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;

        let res = app
            .post_with_token(
                &routes::blog_comments(&ids[0].to_string()),
                &json!({"comments": ["x"]}),
                &token,
            )
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_when_enforcing() {
        let app = spawn_enforcing().await;
        let token = app.create_authenticated_user("mluukkai", "salainen123").await;
        let id = app.create_blog(&token, "blog 3").await;

        let res = app.delete_with_token(&routes::blog(&id), "garbage").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
        assert_eq!(app.blogs_in_db().await.len(), 1);
    }

    #[tokio::test]
    async fn authorization_header_is_ignored_when_not_enforcing() {
        let app = TestApp::spawn().await;
        let ids = app.seed_blogs().await;

        let updated = app
            .put_with_header(
                &routes::blog(&ids[0].to_string()),
                &json!({"likes": 100}),
                "Basic dXNlcjpwYXNz",
            )
            .await;
        assert_eq!(updated.status, 200, "{}", updated.text);
        assert_eq!(updated.body["likes"], 100);

        let commented = app
            .post_with_header(
                &routes::blog_comments(&ids[0].to_string()),
                &json!({"comments": ["still open"]}),
                "Bearer stale.token.value",
            )
            .await;
        assert_eq!(commented.status, 201, "{}", commented.text);

        let deleted = app
            .delete_with_token(&routes::blog(&ids[1].to_string()), "garbage")
            .await;
        assert_eq!(deleted.status, 204);
        assert_eq!(app.blogs_in_db().await.len(), INITIAL_BLOGS.len() - 1);
    }
}

#[tokio::test]
async fn seed_create_delete_scenario() {
    let app = TestApp::spawn().await;
    let ids = app.seed_blogs().await;

    let list = app.get_without_token(routes::BLOGS).await;
    assert_eq!(list.body.as_array().unwrap().len(), 2);

    let token = app.create_authenticated_user("mluukkai", "salainen123").await;
    app.create_blog(&token, "blog 3").await;
    let list = app.get_without_token(routes::BLOGS).await;
    assert_eq!(list.body.as_array().unwrap().len(), 3);

    let res = app.delete_without_token(&routes::blog(&ids[0].to_string())).await;
    assert_eq!(res.status, 204);

    let list = app.get_without_token(routes::BLOGS).await;
    let blogs = list.body.as_array().unwrap();
    assert_eq!(blogs.len(), 2);
    assert!(blogs.iter().all(|b| b["url"] != "blog1.com"));
}
