use dialoguer::{Confirm, Input};
use eyre::{eyre, Context, Result};
use bookseek::BookMetadata;

pub fn user_input(prompt: String) -> Result<String> {
    Input::new()
        .with_prompt(prompt)
        .interact_text()
        .wrap_err_with(|| eyre!("User input cancelled"))
}

fn user_optional_input(prompt: &str) -> Result<Option<String>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .wrap_err_with(|| eyre!("User input cancelled"))?;

    let input = input.trim();
    Ok((!input.is_empty()).then(|| input.to_owned()))
}

pub fn user_confirm(prompt: String) -> Result<bool> {
    Confirm::with_theme(&dialoguer::theme::ColorfulTheme::default())
        .with_prompt(prompt)
        .default(true)
        .interact()
        .wrap_err_with(|| eyre!("User confirmation cancelled"))
}

/// Asks the user for the book information that could not be looked up.
///
/// Authors are entered one at a time, an empty input finishes the list.
pub fn user_enter_metadata(isbn13: &str) -> Result<BookMetadata> {
    println!("Book information not found for ISBN {isbn13} - please enter it manually");

    let title = user_input("Enter the title".to_owned())?;

    let mut authors = Vec::new();
    while let Some(author) = user_optional_input("Enter an author (leave empty to finish)")? {
        authors.push(author);
    }

    let description = user_optional_input("Enter a description (optional)")?;

    Ok(BookMetadata {
        title,
        authors,
        description,
        cover: None,
    })
}
