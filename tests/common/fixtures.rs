use chrono::{TimeZone, Utc};

use sales_report_backend::store::operations::catalog::{
    Product, Question, QuestionType, RetailStore, Worker,
};
use sales_report_backend::store::operations::submissions::{
    Submission, SubmissionAnswer, SubmissionDraft, SubmissionItem,
};
use sales_report_backend::store::Store;

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn seed_worker(store: &Store, name: &str) -> Worker {
    let now = Utc::now();
    let worker = Worker {
        id: new_id(),
        name: name.to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    store.insert_catalog(&worker).expect("insert worker");
    worker
}

pub fn seed_store(store: &Store, name: &str) -> RetailStore {
    let now = Utc::now();
    let retail_store = RetailStore {
        id: new_id(),
        name: name.to_string(),
        location: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    store.insert_catalog(&retail_store).expect("insert store");
    retail_store
}

pub fn seed_product(store: &Store, name: &str, price: f64) -> Product {
    let now = Utc::now();
    let product = Product {
        id: new_id(),
        name: name.to_string(),
        price,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    store.insert_catalog(&product).expect("insert product");
    product
}

pub fn seed_question(
    store: &Store,
    text: &str,
    question_type: QuestionType,
    options: &[&str],
    is_required: bool,
) -> Question {
    let now = Utc::now();
    let question = Question {
        id: new_id(),
        text: text.to_string(),
        question_type,
        options: options.iter().map(|o| o.to_string()).collect(),
        is_required,
        is_active: true,
        order: 0,
        created_at: now,
        updated_at: now,
    };
    store.insert_catalog(&question).expect("insert question");
    question
}

/// Inserts a submission directly, bypassing the HTTP validation path.
pub fn seed_submission(
    store: &Store,
    worker: &Worker,
    retail_store: &RetailStore,
    date: &str,
    items: &[(&Product, u64)],
    answers: &[(&Question, &str)],
) -> Submission {
    let draft = SubmissionDraft {
        worker_id: worker.id.clone(),
        worker_name: worker.name.clone(),
        store_id: retail_store.id.clone(),
        store_name: retail_store.name.clone(),
        date: date.to_string(),
        notes: String::new(),
        items: items
            .iter()
            .map(|(p, qty)| SubmissionItem::new(&p.id, &p.name, *qty, p.price))
            .collect(),
        answers: answers
            .iter()
            .map(|(q, value)| SubmissionAnswer {
                question_id: q.id.clone(),
                question_text: q.text.clone(),
                question_type: q.question_type,
                value: value.to_string(),
            })
            .collect(),
    };
    let created_at = Utc
        .with_ymd_and_hms(2024, 3, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp");
    let submission = Submission::from_draft(new_id(), draft, created_at);
    store.create_submission(&submission).expect("create submission");
    submission
}
