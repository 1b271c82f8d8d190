mod common;

use common::{books, date, dec, setup_json_store};
use money_core::{
    core::services::TransactionService,
    domain::{Account, Category, CategoryType, Transaction},
    reconcile::{match_record, reconcile_statement, StatementRecord},
};

#[test]
fn statement_lines_match_by_date_and_signed_amount() {
    let books = books();
    let store = &books.store;
    let outgoing = store
        .insert(Transaction::new(date(2024, 8, 1), dec("30.00"), &books.a, &books.b))
        .unwrap();
    let incoming = store
        .insert(Transaction::new(date(2024, 8, 1), dec("30.00"), &books.b, &books.a))
        .unwrap();

    let debit = StatementRecord::builder(date(2024, 8, 1))
        .amount("-30,00")
        .build(store);
    let credit = StatementRecord::builder(date(2024, 8, 1))
        .amount("30.00")
        .build(store);

    assert_eq!(match_record(store, &books.a, &debit, true), vec![outgoing]);
    assert_eq!(match_record(store, &books.a, &credit, true), vec![incoming]);
}

#[test]
fn repeated_runs_produce_identical_matches() {
    let books = books();
    let store = &books.store;
    for _ in 0..4 {
        store
            .insert(Transaction::new(date(2024, 8, 2), dec("5"), &books.b, &books.a))
            .unwrap();
    }
    let record = StatementRecord::builder(date(2024, 8, 2))
        .amount("5")
        .build(store);

    let first = match_record(store, &books.a, &record, true);
    let second = match_record(store, &books.a, &record, true);
    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
    assert_eq!(first, store.transactions_for_account(books.a.id));
}

#[test]
fn matched_lines_can_be_checked_off() {
    let (store, manager, _config) = setup_json_store();
    let config = manager.load().unwrap();
    let banks = store
        .insert(Category::new("Banks", CategoryType::BanksAndCash))
        .unwrap();
    let food = store
        .insert(Category::new("Food", CategoryType::Expenses))
        .unwrap();
    let card = store
        .insert(Account::new("Card", &banks).with_account_number("4081 7810"))
        .unwrap();
    let grocer = store.insert(Account::new("Grocer", &food)).unwrap();
    let lunch = store
        .insert(
            Transaction::new(date(2024, 9, 2), dec("12.40"), &card, &grocer)
                .with_statement_date(date(2024, 9, 4)),
        )
        .unwrap();

    let account = store.account_by_number("40817810").expect("account by number");
    let mut records = vec![
        StatementRecord::builder(date(2024, 9, 2))
            .execution(date(2024, 9, 4))
            .description("LUNCH")
            .account_amount("-12,40")
            .build(&store),
        StatementRecord::builder(date(2024, 9, 3))
            .amount("-1.00")
            .build(&store),
    ];

    let matched = reconcile_statement(&store, &account, &mut records, config.ignore_execution_date);
    assert_eq!(matched, 1);

    let ids: Vec<_> = records
        .iter()
        .flat_map(|record| record.matched().iter().map(|txn| txn.id))
        .collect();
    TransactionService::check(&store, &ids, true).unwrap();
    assert!(store.get::<Transaction>(lunch.id).unwrap().checked);

    assert_eq!(
        reconcile_statement(&store, &account, &mut records, false),
        1,
        "execution date matches too"
    );
}
