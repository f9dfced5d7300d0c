use owo_colors::OwoColorize as _;

pub fn created_line(name: &str) -> String {
  format!("Project {name} created successfully!")
}

pub fn next_steps_lines(name: &str) -> Vec<String> {
  vec![
    format!("Navigate to {name} and run 'npm i' to install dependencies.")
      .bright_yellow()
      .to_string(),
    "Then use npm run start to start the dev server."
      .bright_yellow()
      .to_string(),
  ]
}

pub fn thank_you_line() -> String {
  "THANK YOU SO MUCH FOR CHOOSING SEA JS!"
    .black()
    .on_yellow()
    .to_string()
}
