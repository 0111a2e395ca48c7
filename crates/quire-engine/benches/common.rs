// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markup(size: usize) -> String {
    let base = concat!(
        "<h2>Section</h2>",
        "<p>Paragraph with <strong>bold</strong>, <em>italic</em> and a <a href=\"/x\">link</a>.</p>",
        "<ul><li>Bullet point<ul><li>Nested item</li></ul></li><li>Another item</li></ul>",
        "<table><tr><td>a</td><td>b</td></tr><tr><td colspan=\"2\"></td></tr></table>",
        "<pre><code class=\"language-rust\">fn example() {\n    println!(\"Hello\");\n}</code></pre>",
        "<div style=\"background-color:#fff3cd\">Careful now</div>",
    );
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_paragraphs(count: usize) -> String {
    (0..count)
        .map(|i| format!("<p data-block-id=\"p{i}\">Paragraph {i} with some text to mark.</p>"))
        .collect()
}
