use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use lms_admin_server::schema;

mod helpers;
use helpers::{
    count_all_options, count_questions_in_quiz, count_quizzes_in_module, create_test_answer,
    create_test_attempt, create_test_course, create_test_module, create_test_question,
    create_test_quiz, create_test_student, fetch_options, fields, is_error, is_notice,
    latest_question, location, setup_test_environment,
};

async fn seed_module(pool: &helpers::TestPool, title: &str) -> i64 {
    let course_id = create_test_course(pool, title).await;
    create_test_module(pool, course_id, 1, "Assessment Module").await
}

// quizzes

#[tokio::test]
async fn test_second_final_quiz_in_module_is_rejected() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Final Course").await;
    create_test_quiz(&pool, module_id, "Final Exam", "final").await;

    let response = server
        .post("/quizzes")
        .form(&fields(&[
            ("module_id", module_id.to_string().as_str()),
            ("title", "Another Final"),
            ("quiz_type", "final"),
            ("pass_threshold", "80"),
            ("is_active", "on"),
        ]))
        .await;
    let target = location(&response);
    assert!(is_error(&target), "{}", target);
    assert!(target.contains("already+has+a+final+quiz"), "{}", target);
    assert_eq!(count_quizzes_in_module(&pool, module_id).await, 1);

    let response = server
        .post("/quizzes")
        .form(&fields(&[
            ("module_id", module_id.to_string().as_str()),
            ("title", "Practice Quiz"),
            ("quiz_type", "module"),
            ("pass_threshold", "60"),
            ("time_limit_minutes", "15"),
            ("is_active", "on"),
        ]))
        .await;
    assert!(is_notice(&location(&response)));
    assert_eq!(count_quizzes_in_module(&pool, module_id).await, 2);
}

#[tokio::test]
async fn test_quiz_requires_an_active_module() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Inactive Module Course").await;
    server
        .post(&format!("/modules/{}/toggle", module_id))
        .await;

    let response = server
        .post("/quizzes")
        .form(&fields(&[
            ("module_id", module_id.to_string().as_str()),
            ("title", "Orphan Quiz"),
            ("quiz_type", "module"),
            ("pass_threshold", "70"),
        ]))
        .await;
    assert!(is_error(&location(&response)));
    assert_eq!(count_quizzes_in_module(&pool, module_id).await, 0);
}

#[tokio::test]
async fn test_quiz_threshold_and_time_limit_are_bounded() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Bounds Course").await;

    for (threshold, limit) in [("0", ""), ("101", ""), ("70", "601")] {
        let response = server
            .post("/quizzes")
            .form(&fields(&[
                ("module_id", module_id.to_string().as_str()),
                ("title", "Bounded"),
                ("quiz_type", "module"),
                ("pass_threshold", threshold),
                ("time_limit_minutes", limit),
            ]))
            .await;
        assert!(is_error(&location(&response)), "{} / {}", threshold, limit);
    }
    assert_eq!(count_quizzes_in_module(&pool, module_id).await, 0);
}

#[tokio::test]
async fn test_delete_quiz_with_attempts_is_blocked() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Attempted Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Attempted Quiz", "module").await;
    create_test_question(
        &pool,
        quiz_id,
        "multiple_choice",
        &[("A", true), ("B", false)],
    )
    .await;
    let student_id = create_test_student(&pool, "attempt@test.com", "Attempt").await;
    create_test_attempt(&pool, quiz_id, student_id, 50.0, false).await;

    let response = server.post(&format!("/quizzes/{}/delete", quiz_id)).await;
    let target = location(&response);
    assert!(is_error(&target), "{}", target);
    assert!(target.contains("attempt"), "{}", target);

    assert_eq!(count_quizzes_in_module(&pool, module_id).await, 1);
    assert_eq!(count_questions_in_quiz(&pool, quiz_id).await, 1);
    assert_eq!(count_all_options(&pool).await, 2);
}

#[tokio::test]
async fn test_delete_quiz_without_attempts_cascades() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Cascade Quiz Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Doomed Quiz", "module").await;
    let other_quiz = create_test_quiz(&pool, module_id, "Kept Quiz", "module").await;
    create_test_question(
        &pool,
        quiz_id,
        "multiple_choice",
        &[("A", true), ("B", false), ("C", false)],
    )
    .await;
    create_test_question(
        &pool,
        quiz_id,
        "true_false",
        &[("True", false), ("False", true)],
    )
    .await;
    create_test_question(&pool, other_quiz, "true_false", &[("True", true), ("False", false)])
        .await;

    let response = server.post(&format!("/quizzes/{}/delete", quiz_id)).await;
    assert!(is_notice(&location(&response)));

    assert_eq!(count_quizzes_in_module(&pool, module_id).await, 1);
    assert_eq!(count_questions_in_quiz(&pool, quiz_id).await, 0);
    assert_eq!(count_questions_in_quiz(&pool, other_quiz).await, 1);
    assert_eq!(count_all_options(&pool).await, 2);
}

#[tokio::test]
async fn test_quiz_with_attempts_cannot_move_module() {
    let (server, pool) = setup_test_environment().await;
    let course_id = create_test_course(&pool, "Move Course").await;
    let from_module = create_test_module(&pool, course_id, 1, "From").await;
    let to_module = create_test_module(&pool, course_id, 2, "To").await;
    let quiz_id = create_test_quiz(&pool, from_module, "Moving Quiz", "module").await;
    let student_id = create_test_student(&pool, "mover@test.com", "Mover").await;
    create_test_attempt(&pool, quiz_id, student_id, 90.0, true).await;

    let response = server
        .post(&format!("/quizzes/{}", quiz_id))
        .form(&fields(&[
            ("module_id", to_module.to_string().as_str()),
            ("title", "Moving Quiz"),
            ("quiz_type", "module"),
            ("pass_threshold", "70"),
            ("is_active", "on"),
        ]))
        .await;
    let target = location(&response);
    assert!(
        target.starts_with(&format!("/quizzes/{}/edit?error=", quiz_id)),
        "{}",
        target
    );
    assert_eq!(count_quizzes_in_module(&pool, from_module).await, 1);
    assert_eq!(count_quizzes_in_module(&pool, to_module).await, 0);
}

async fn quiz_state(pool: &helpers::TestPool, quiz_id: i64) -> (String, String, bool, DateTime<Utc>) {
    pool.get()
        .await
        .unwrap()
        .interact(move |conn| {
            schema::quizzes::table
                .find(quiz_id)
                .select((
                    schema::quizzes::title,
                    schema::quizzes::quiz_type,
                    schema::quizzes::is_active,
                    schema::quizzes::updated_at,
                ))
                .first::<(String, String, bool, DateTime<Utc>)>(conn)
        })
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn test_update_quiz_to_final_when_module_has_one_is_rejected() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Promotion Course").await;
    let final_quiz = create_test_quiz(&pool, module_id, "Final Exam", "final").await;
    let practice = create_test_quiz(&pool, module_id, "Practice", "module").await;
    let module = module_id.to_string();

    let response = server
        .post(&format!("/quizzes/{}", practice))
        .form(&fields(&[
            ("module_id", module.as_str()),
            ("title", "Practice"),
            ("quiz_type", "final"),
            ("pass_threshold", "70"),
            ("is_active", "on"),
        ]))
        .await;
    let target = location(&response);
    assert!(
        target.starts_with(&format!("/quizzes/{}/edit?error=", practice)),
        "{}",
        target
    );
    assert!(target.contains("already+has+a+final+quiz"), "{}", target);
    assert_eq!(quiz_state(&pool, practice).await.1, "module");

    let response = server
        .post(&format!("/quizzes/{}", final_quiz))
        .form(&fields(&[
            ("module_id", module.as_str()),
            ("title", "Final Exam (revised)"),
            ("quiz_type", "final"),
            ("pass_threshold", "85"),
            ("is_active", "on"),
        ]))
        .await;
    assert!(is_notice(&location(&response)));
    let (title, quiz_type, _, _) = quiz_state(&pool, final_quiz).await;
    assert_eq!(title, "Final Exam (revised)");
    assert_eq!(quiz_type, "final");
}

#[tokio::test]
async fn test_toggle_quiz_changes_only_the_flag() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Toggle Quiz Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Switchable Quiz", "module").await;
    let before = quiz_state(&pool, quiz_id).await;

    let response = server
        .post(&format!("/quizzes/{}/toggle", quiz_id))
        .await;
    let target = location(&response);
    assert!(target.contains("Quiz+deactivated"), "{}", target);

    let after = quiz_state(&pool, quiz_id).await;
    assert_eq!(
        (&before.0, &before.1, before.3),
        (&after.0, &after.1, after.3)
    );
    assert!(before.2);
    assert!(!after.2);

    let response = server
        .post(&format!("/quizzes/{}/toggle", quiz_id))
        .await;
    assert!(location(&response).contains("Quiz+activated"));
    assert!(quiz_state(&pool, quiz_id).await.2);
}

#[tokio::test]
async fn test_bulk_delete_quizzes_is_all_or_nothing() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Bulk Quiz Course").await;
    let free = create_test_quiz(&pool, module_id, "Free Quiz", "module").await;
    let attempted = create_test_quiz(&pool, module_id, "Attempted Quiz", "module").await;
    let student_id = create_test_student(&pool, "bulkquiz@test.com", "Bulk").await;
    create_test_attempt(&pool, attempted, student_id, 40.0, false).await;

    let response = server
        .post("/quizzes/bulk")
        .form(&fields(&[
            ("action", "delete"),
            ("id", free.to_string().as_str()),
            ("id", attempted.to_string().as_str()),
        ]))
        .await;
    assert!(is_error(&location(&response)));
    assert_eq!(count_quizzes_in_module(&pool, module_id).await, 2);

    let response = server
        .post("/quizzes/bulk")
        .form(&fields(&[("action", "delete"), ("id", free.to_string().as_str())]))
        .await;
    assert!(is_notice(&location(&response)));
    assert_eq!(count_quizzes_in_module(&pool, module_id).await, 1);
}

#[tokio::test]
async fn test_list_quizzes_shows_aggregates() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Listing Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Scored Quiz", "final").await;
    create_test_question(&pool, quiz_id, "true_false", &[("True", true), ("False", false)]).await;
    let student_id = create_test_student(&pool, "scored@test.com", "Scored").await;
    create_test_attempt(&pool, quiz_id, student_id, 80.0, true).await;
    create_test_attempt(&pool, quiz_id, student_id, 60.0, false).await;

    let response = server
        .get("/quizzes")
        .add_query_param("quiz_type", "final")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.text();
    assert!(body.contains("Scored Quiz"));
    assert!(body.contains("70.0"), "average score of 80 and 60");
}

// questions

#[tokio::test]
async fn test_question_with_options_then_answered_delete_is_blocked() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Question Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz Q", "module").await;

    let response = server
        .post("/questions")
        .form(&fields(&[
            ("quiz_id", quiz_id.to_string().as_str()),
            ("question_text", "Which vitamin is fat soluble?"),
            ("question_type", "multiple_choice"),
            ("points", "5"),
            ("order_sequence", ""),
            ("option_text_1", "Vitamin C"),
            ("option_text_2", "Vitamin D"),
            ("option_correct_2", "on"),
        ]))
        .await;
    let target = location(&response);
    assert!(
        target.starts_with(&format!("/questions?quiz_id={}&notice=", quiz_id)),
        "{}",
        target
    );

    let (question_id, question_type) = latest_question(&pool, quiz_id).await.unwrap();
    assert_eq!(question_type, "multiple_choice");
    let options = fetch_options(&pool, question_id).await;
    assert_eq!(
        options,
        vec![
            ("Vitamin C".to_string(), false, 1),
            ("Vitamin D".to_string(), true, 2),
        ]
    );

    let student_id = create_test_student(&pool, "answer@test.com", "Answer").await;
    let attempt_id = create_test_attempt(&pool, quiz_id, student_id, 100.0, true).await;
    create_test_answer(&pool, attempt_id, question_id, None).await;

    let response = server
        .post(&format!("/questions/{}/delete", question_id))
        .await;
    let target = location(&response);
    assert!(is_error(&target), "{}", target);
    assert_eq!(count_questions_in_quiz(&pool, quiz_id).await, 1);
    assert_eq!(fetch_options(&pool, question_id).await.len(), 2);
}

#[tokio::test]
async fn test_multiple_choice_without_correct_option_writes_nothing() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Invalid Question Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz", "module").await;

    let response = server
        .post("/questions")
        .form(&fields(&[
            ("quiz_id", quiz_id.to_string().as_str()),
            ("question_text", "Pick one"),
            ("question_type", "multiple_choice"),
            ("points", "1"),
            ("option_text_1", "Yes"),
            ("option_text_2", "No"),
        ]))
        .await;
    let target = location(&response);
    assert!(
        target.starts_with(&format!("/questions/new?quiz_id={}&error=", quiz_id)),
        "{}",
        target
    );

    let response = server
        .post("/questions")
        .form(&fields(&[
            ("quiz_id", quiz_id.to_string().as_str()),
            ("question_text", "Only one option"),
            ("question_type", "multiple_choice"),
            ("points", "1"),
            ("option_text_1", "Lonely"),
            ("option_correct_1", "on"),
        ]))
        .await;
    assert!(is_error(&location(&response)));

    assert_eq!(count_questions_in_quiz(&pool, quiz_id).await, 0);
    assert_eq!(count_all_options(&pool).await, 0);
}

#[tokio::test]
async fn test_question_and_option_forms_with_wrong_content_type_are_rejected() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Plain Text Quiz Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz", "module").await;
    let (question_id, _) = create_test_question(
        &pool,
        quiz_id,
        "multiple_choice",
        &[("Right", true), ("Wrong", false)],
    )
    .await;

    let response = server
        .post("/questions")
        .text(format!(
            "quiz_id={}&question_text=Plain&question_type=short_answer&points=1",
            quiz_id
        ))
        .await;
    let target = location(&response);
    assert!(target.starts_with("/questions/new?error="), "{}", target);
    assert_eq!(count_questions_in_quiz(&pool, quiz_id).await, 1);

    let response = server
        .post(&format!("/questions/{}/options/bulk", question_id))
        .text("anything")
        .await;
    let target = location(&response);
    assert!(
        target.starts_with(&format!("/questions/{}/options?error=", question_id)),
        "{}",
        target
    );
    assert_eq!(count_all_options(&pool).await, 2);
}

#[tokio::test]
async fn test_true_false_question_synthesises_two_options() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "True False Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz", "module").await;

    let response = server
        .post("/questions")
        .form(&fields(&[
            ("quiz_id", quiz_id.to_string().as_str()),
            ("question_text", "Water boils at 100C at sea level."),
            ("question_type", "true_false"),
            ("points", "2"),
            ("correct_answer", "false"),
            ("option_text_1", "ignored"),
        ]))
        .await;
    assert!(is_notice(&location(&response)));

    let (question_id, _) = latest_question(&pool, quiz_id).await.unwrap();
    assert_eq!(
        fetch_options(&pool, question_id).await,
        vec![("True".to_string(), false, 1), ("False".to_string(), true, 2)]
    );

    let response = server
        .post(&format!("/questions/{}", question_id))
        .form(&fields(&[
            ("question_text", "Water boils at 100C at sea level."),
            ("points", "2"),
            ("order_sequence", "1"),
            ("is_active", "on"),
            ("correct_answer", "true"),
        ]))
        .await;
    assert!(is_notice(&location(&response)));
    assert_eq!(
        fetch_options(&pool, question_id).await,
        vec![("True".to_string(), true, 1), ("False".to_string(), false, 2)]
    );
}

#[tokio::test]
async fn test_true_false_question_requires_an_answer() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Unanswered Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz", "module").await;

    let response = server
        .post("/questions")
        .form(&fields(&[
            ("quiz_id", quiz_id.to_string().as_str()),
            ("question_text", "The sky is green."),
            ("question_type", "true_false"),
            ("points", "1"),
        ]))
        .await;
    assert!(is_error(&location(&response)));
    assert_eq!(count_questions_in_quiz(&pool, quiz_id).await, 0);
}

#[tokio::test]
async fn test_short_answer_question_stores_no_options() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Short Answer Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz", "module").await;

    let response = server
        .post("/questions")
        .form(&fields(&[
            ("quiz_id", quiz_id.to_string().as_str()),
            ("question_text", "Name the largest organ."),
            ("question_type", "short_answer"),
            ("points", "3"),
            ("order_sequence", "7"),
            ("option_text_1", "Skin"),
            ("option_correct_1", "on"),
        ]))
        .await;
    assert!(is_notice(&location(&response)));

    let (question_id, question_type) = latest_question(&pool, quiz_id).await.unwrap();
    assert_eq!(question_type, "short_answer");
    assert!(fetch_options(&pool, question_id).await.is_empty());
}

#[tokio::test]
async fn test_toggle_question_changes_only_the_flag() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Toggle Question Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz", "module").await;
    let (question_id, _) =
        create_test_question(&pool, quiz_id, "true_false", &[("True", true), ("False", false)])
            .await;

    let read = move |conn: &mut PgConnection| {
        schema::questions::table
            .find(question_id)
            .select((
                schema::questions::question_text,
                schema::questions::points,
                schema::questions::is_active,
                schema::questions::updated_at,
            ))
            .first::<(String, i32, bool, DateTime<Utc>)>(conn)
    };
    let before = pool.get().await.unwrap().interact(read).await.unwrap().unwrap();

    let response = server
        .post(&format!("/questions/{}/toggle", question_id))
        .await;
    assert!(is_notice(&location(&response)));

    let after = pool.get().await.unwrap().interact(read).await.unwrap().unwrap();
    assert_eq!((&before.0, before.1, before.3), (&after.0, after.1, after.3));
    assert_ne!(before.2, after.2);
}

// options

#[tokio::test]
async fn test_option_update_that_unmarks_every_correct_option_rolls_back() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Rollback Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz", "module").await;
    let (question_id, option_ids) = create_test_question(
        &pool,
        quiz_id,
        "multiple_choice",
        &[("Iron", true), ("Neon", false), ("Argon", false)],
    )
    .await;

    let mut form = Vec::new();
    for (id, text) in option_ids.iter().zip(["Iron (Fe)", "Neon (Ne)", "Argon (Ar)"]) {
        form.push((format!("text_{}", id), text.to_string()));
        form.push((format!("order_{}", id), String::new()));
    }

    let response = server
        .post(&format!("/questions/{}/options/bulk", question_id))
        .form(&form)
        .await;
    let target = location(&response);
    assert!(
        target.starts_with(&format!("/questions/{}/options?error=", question_id)),
        "{}",
        target
    );

    assert_eq!(
        fetch_options(&pool, question_id).await,
        vec![
            ("Iron".to_string(), true, 1),
            ("Neon".to_string(), false, 2),
            ("Argon".to_string(), false, 3),
        ]
    );
}

#[tokio::test]
async fn test_option_update_overwrites_non_blank_rows() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Option Edit Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz", "module").await;
    let (question_id, option_ids) = create_test_question(
        &pool,
        quiz_id,
        "multiple_choice",
        &[("Iron", true), ("Neon", false), ("Argon", false)],
    )
    .await;
    let (iron, neon, argon) = (option_ids[0], option_ids[1], option_ids[2]);

    let response = server
        .post(&format!("/questions/{}/options/bulk", question_id))
        .form(&fields(&[
            (format!("text_{}", iron).as_str(), "Iron"),
            (format!("order_{}", iron).as_str(), "3"),
            (format!("text_{}", neon).as_str(), "Neon"),
            (format!("correct_{}", neon).as_str(), "on"),
            (format!("order_{}", neon).as_str(), "1"),
            (format!("text_{}", argon).as_str(), ""),
        ]))
        .await;
    assert!(is_notice(&location(&response)));

    assert_eq!(
        fetch_options(&pool, question_id).await,
        vec![
            ("Neon".to_string(), true, 1),
            ("Iron".to_string(), false, 3),
            ("Argon".to_string(), false, 3),
        ]
    );
}

#[tokio::test]
async fn test_add_option_only_to_multiple_choice() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Add Option Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz", "module").await;
    let (choice_question, _) = create_test_question(
        &pool,
        quiz_id,
        "multiple_choice",
        &[("A", true), ("B", false)],
    )
    .await;
    let (binary_question, _) =
        create_test_question(&pool, quiz_id, "true_false", &[("True", true), ("False", false)])
            .await;

    let response = server
        .post(&format!("/questions/{}/options", choice_question))
        .form(&fields(&[("option_text", "C"), ("is_correct", "on")]))
        .await;
    assert!(is_notice(&location(&response)));
    let options = fetch_options(&pool, choice_question).await;
    assert_eq!(options.last(), Some(&("C".to_string(), true, 3)));

    let response = server
        .post(&format!("/questions/{}/options", binary_question))
        .form(&fields(&[("option_text", "Maybe")]))
        .await;
    assert!(is_error(&location(&response)));
    assert_eq!(fetch_options(&pool, binary_question).await.len(), 2);
}

#[tokio::test]
async fn test_add_option_stops_at_the_last_position_the_editor_accepts() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Crowded Option Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz", "module").await;
    let (question_id, option_ids) = create_test_question(
        &pool,
        quiz_id,
        "multiple_choice",
        &[("A", true), ("B", false)],
    )
    .await;
    let (first, last) = (option_ids[0], option_ids[1]);
    pool.get()
        .await
        .unwrap()
        .interact(move |conn| {
            diesel::update(schema::question_options::table.find(last))
                .set(schema::question_options::order_sequence.eq(99))
                .execute(conn)
        })
        .await
        .unwrap()
        .unwrap();

    let response = server
        .post(&format!("/questions/{}/options", question_id))
        .form(&fields(&[("option_text", "C")]))
        .await;
    let target = location(&response);
    assert!(is_error(&target), "{}", target);
    assert!(target.contains("Renumber"), "{}", target);
    assert_eq!(fetch_options(&pool, question_id).await.len(), 2);

    let response = server
        .post(&format!("/questions/{}/options/bulk", question_id))
        .form(&fields(&[
            (format!("text_{}", first).as_str(), "A"),
            (format!("correct_{}", first).as_str(), "on"),
            (format!("order_{}", first).as_str(), "1"),
            (format!("text_{}", last).as_str(), "B"),
            (format!("order_{}", last).as_str(), "2"),
        ]))
        .await;
    assert!(is_notice(&location(&response)));

    let response = server
        .post(&format!("/questions/{}/options", question_id))
        .form(&fields(&[("option_text", "C")]))
        .await;
    assert!(is_notice(&location(&response)));
    assert_eq!(
        fetch_options(&pool, question_id).await,
        vec![
            ("A".to_string(), true, 1),
            ("B".to_string(), false, 2),
            ("C".to_string(), false, 3),
        ]
    );
}

#[tokio::test]
async fn test_delete_option_guards() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Delete Option Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz", "module").await;
    let (question_id, option_ids) = create_test_question(
        &pool,
        quiz_id,
        "multiple_choice",
        &[("A", true), ("B", false), ("C", false)],
    )
    .await;
    let (a, b, c) = (option_ids[0], option_ids[1], option_ids[2]);
    let student_id = create_test_student(&pool, "picker@test.com", "Picker").await;
    let attempt_id = create_test_attempt(&pool, quiz_id, student_id, 100.0, true).await;
    create_test_answer(&pool, attempt_id, question_id, Some(b)).await;

    // answered
    let response = server.post(&format!("/options/{}/delete", b)).await;
    let target = location(&response);
    assert!(
        target.starts_with(&format!("/questions/{}/options?error=", question_id)),
        "{}",
        target
    );

    // the only correct option
    let response = server.post(&format!("/options/{}/delete", a)).await;
    assert!(is_error(&location(&response)));

    let response = server.post(&format!("/options/{}/delete", c)).await;
    assert!(is_notice(&location(&response)));

    assert_eq!(
        fetch_options(&pool, question_id).await,
        vec![("A".to_string(), true, 1), ("B".to_string(), false, 2)]
    );
}

#[tokio::test]
async fn test_option_editor_renders() {
    let (server, pool) = setup_test_environment().await;
    let module_id = seed_module(&pool, "Editor Course").await;
    let quiz_id = create_test_quiz(&pool, module_id, "Quiz", "module").await;
    let (question_id, _) = create_test_question(
        &pool,
        quiz_id,
        "multiple_choice",
        &[("Alpha & Omega", true), ("Beta", false)],
    )
    .await;

    let response = server
        .get(&format!("/questions/{}/options", question_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("Alpha &amp; Omega"));

    let response = server.get("/questions/987654/options").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
