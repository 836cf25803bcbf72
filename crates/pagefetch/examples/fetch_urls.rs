//! Example: Fetch a few live URLs and display results
//!
//! Run with: cargo run -p pagefetch --example fetch_urls

use pagefetch::{FetchUrlRequest, FetchUrlResponse, Tool};

struct Case {
    url: &'static str,
    description: &'static str,
    links_only: bool,
    expect_contains: Option<&'static str>,
    expect_error: bool,
}

const CASES: &[Case] = &[
    Case {
        url: "https://example.com",
        description: "Simple HTML page",
        links_only: false,
        expect_contains: Some("Example Domain"),
        expect_error: false,
    },
    Case {
        url: "https://httpbin.org/html",
        description: "Long-form text",
        links_only: false,
        expect_contains: Some("Herman Melville"),
        expect_error: false,
    },
    Case {
        url: "https://www.rust-lang.org",
        description: "Links only",
        links_only: true,
        expect_contains: None,
        expect_error: false,
    },
    Case {
        url: "https://httpbin.org/status/404",
        description: "Missing page",
        links_only: false,
        expect_contains: None,
        expect_error: true,
    },
];

#[tokio::main]
async fn main() {
    println!("PageFetch URL Examples");
    println!("======================\n");

    let tool = Tool::default();
    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in CASES.iter().enumerate() {
        println!("{}. {}", i + 1, case.description);
        println!("   URL: {}", case.url);

        let mut request = FetchUrlRequest::new(case.url);
        if case.links_only {
            request = request.links_only();
        }

        let response = tool.run(request).await;
        print_summary(&response);

        if check(case, &response) {
            println!("   ✓ PASS\n");
            passed += 1;
        } else {
            println!("   ✗ FAIL\n");
            failed += 1;
        }
    }

    println!("======================");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_summary(response: &FetchUrlResponse) {
    if let Some(ref metadata) = response.metadata {
        if let Some(ref title) = metadata.title {
            println!("   Title: {}", title);
        }
    }

    if let Some(count) = response.link_count {
        println!("   Links: {}", count);
    }

    if let Some(ref content) = response.content {
        let preview = content.chars().take(100).collect::<String>();
        println!("   Preview: {}", preview.replace('\n', " "));
    }

    if let Some(ref error) = response.error {
        println!("   Error: {}", error);
    }
}

fn check(case: &Case, response: &FetchUrlResponse) -> bool {
    if response.is_error() != case.expect_error {
        return false;
    }

    if let Some(expected) = case.expect_contains {
        let content = response.content.as_deref().unwrap_or("");
        if !content.contains(expected) {
            println!("   Expected content to contain '{}'", expected);
            return false;
        }
    }

    true
}
