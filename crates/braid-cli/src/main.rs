use std::sync::Arc;
use std::time::Duration;

use braid_core::backref::{self, Dependent, Owner};
use braid_core::fetch::{FlakyFetcher, SimulatedFetcher, VALID_URL};
use braid_core::guard::StateGuard;
use braid_core::join::TaskJoiner;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // (A) StateGuard: 並行 increment しても取りこぼしが出ない
    let guard = StateGuard::new();
    let mut joins = Vec::with_capacity(8);
    for _ in 0..8 {
        let g = guard.clone();
        joins.push(tokio::spawn(async move {
            for _ in 0..100 {
                g.increment().await;
            }
        }));
    }
    for j in joins {
        let _ = j.await;
    }
    println!("guard value after 8x100 increments: {}", guard.get_value().await);

    // (B) TaskJoiner: 3 本の fetch を同時に起動して起動順で join する
    let joiner = TaskJoiner::new(Arc::new(SimulatedFetcher::new(Duration::from_millis(
        300,
    ))));
    match joiner.run_concurrent(3).await {
        Ok(results) => println!("concurrent results: {results:?}"),
        Err(e) => println!("concurrent failure: {e}"),
    }

    // (C) 失敗パス: 最初の 1 回だけ失敗する fetcher で同じ run を回す
    let flaky = TaskJoiner::new(Arc::new(FlakyFetcher::new(Duration::from_millis(100), 1)));
    let report = flaky.run_urls(vec![VALID_URL.to_string(); 3]).await;
    println!("flaky counts: {:?}", report.counts());
    println!(
        "flaky report: {}",
        serde_json::to_string_pretty(&report).unwrap()
    );
    match report.into_result() {
        Ok(results) => println!("flaky results: {results:?}"),
        Err(e) => println!("flaky failure: {e}"),
    }

    // (D) BackRefPair: release 後は逆エッジが解決できなくなる
    let owner = Owner::new("alice");
    let dependent = Dependent::new("cat");
    backref::attach(&owner, Arc::clone(&dependent)).await;
    println!(
        "back edge before release: {:?}",
        dependent.owner().await.map(|o| o.name().to_string())
    );
    backref::release(owner);
    println!(
        "back edge after release: {:?}",
        dependent.owner().await.map(|o| o.name().to_string())
    );
}
