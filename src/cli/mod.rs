//! Interactive interpreter for the `recipebox` binary. Lines are parsed into a
//! `Command` and executed against a `RecipeBox`; every failure is printed
//! inline and the loop keeps going.

pub mod table;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::app::RecipeBox;
use crate::catalog::{CookingTime, FavoriteChange, RecipeDraft, RecipeQuery};
use crate::error::AppResult;
use crate::identity::Session;

use table::{print_table, recipe_rows, RECIPE_COLUMNS};

pub const HELP: &str = "\
Commands:
  login <email> <password>                  sign in as a regular user
  register <name...> <email> <password>     create an account and sign in
  logout                                    sign out (local only)
  whoami                                    show the user session
  recipes [search] [--time quick|medium|long]   search recipes; commas mean all ingredients
  favorites                                 list your favorite recipes
  fav <recipe id>                           add or remove a favorite
  admin login <password>                    sign in to the admin panel
  admin setup <username> <password> <confirm>   one-time admin account creation
  admin logout | admin status
  admin recipes                             list recipes (admin)
  admin add <title> | <ingredients> | <instructions> | <minutes> | <servings>
  admin edit <id> <title> | <ingredients> | <instructions> | <minutes> | <servings>
  admin delete <id>
  help                                      show this help
  quit | exit                               leave the interpreter";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    Register { name: String, email: String, password: String },
    Logout,
    WhoAmI,
    Recipes(RecipeQuery),
    Favorites,
    ToggleFavorite(String),
    AdminLogin(String),
    AdminSetup { username: String, password: String, confirm: String },
    AdminLogout,
    AdminStatus,
    AdminRecipes,
    AdminAdd(RecipeDraft),
    AdminEdit { id: String, draft: RecipeDraft },
    AdminDelete(String),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(head) = parts.first() else { return Err("empty command".into()) };
    match head.to_ascii_lowercase().as_str() {
        "login" => match parts.as_slice() {
            [_, email, password] => Ok(Command::Login { email: email.to_string(), password: password.to_string() }),
            _ => Err("usage: login <email> <password>".into()),
        },
        "register" => {
            if parts.len() < 4 { return Err("usage: register <name...> <email> <password>".into()); }
            let n = parts.len();
            Ok(Command::Register {
                name: parts[1..n - 2].join(" "),
                email: parts[n - 2].to_string(),
                password: parts[n - 1].to_string(),
            })
        }
        "logout" => Ok(Command::Logout),
        "whoami" | "status" => Ok(Command::WhoAmI),
        "recipes" => parse_recipes(&parts[1..]).map(Command::Recipes),
        "favorites" => Ok(Command::Favorites),
        "fav" => match parts.as_slice() {
            [_, id] => Ok(Command::ToggleFavorite(id.to_string())),
            _ => Err("usage: fav <recipe id>".into()),
        },
        "admin" => parse_admin(line, &parts[1..]),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}'; type 'help'", other)),
    }
}

fn parse_recipes(args: &[&str]) -> Result<RecipeQuery, String> {
    let mut q = RecipeQuery::new();
    let mut words: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--time" {
            let v = args.get(i + 1).ok_or("--time requires quick, medium or long")?;
            q = q.cooking_time(v.parse::<CookingTime>().map_err(|e| e.message().to_string())?);
            i += 2;
            continue;
        }
        words.push(args[i]);
        i += 1;
    }
    if !words.is_empty() {
        q = q.search(words.join(" "));
    }
    Ok(q)
}

fn parse_admin(line: &str, args: &[&str]) -> Result<Command, String> {
    let Some(sub) = args.first() else { return Err("usage: admin <login|setup|logout|status|recipes|add|edit|delete>".into()) };
    match (sub.to_ascii_lowercase().as_str(), args.len()) {
        ("login", 2) => Ok(Command::AdminLogin(args[1].to_string())),
        ("login", _) => Err("usage: admin login <password>".into()),
        ("setup", 4) => Ok(Command::AdminSetup {
            username: args[1].to_string(),
            password: args[2].to_string(),
            confirm: args[3].to_string(),
        }),
        ("setup", _) => Err("usage: admin setup <username> <password> <confirm>".into()),
        ("logout", _) => Ok(Command::AdminLogout),
        ("status", _) => Ok(Command::AdminStatus),
        ("recipes", _) => Ok(Command::AdminRecipes),
        ("add", _) => {
            let rest = after_words(line, 2);
            parse_draft(rest).map(Command::AdminAdd)
        }
        ("edit", n) if n >= 3 => {
            let id = args[1].to_string();
            let rest = after_words(line, 3);
            parse_draft(rest).map(|draft| Command::AdminEdit { id, draft })
        }
        ("edit", _) => Err("usage: admin edit <id> <title> | <ingredients> | <instructions> | <minutes> | <servings>".into()),
        ("delete", 2) => Ok(Command::AdminDelete(args[1].to_string())),
        ("delete", _) => Err("usage: admin delete <id>".into()),
        (other, _) => Err(format!("unknown admin command '{}'", other)),
    }
}

// Remainder of `line` after skipping `n` whitespace-separated words.
fn after_words(line: &str, n: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..n {
        rest = match rest.find(char::is_whitespace) {
            Some(pos) => rest[pos..].trim_start(),
            None => "",
        };
    }
    rest
}

fn parse_draft(text: &str) -> Result<RecipeDraft, String> {
    let fields: Vec<&str> = text.split('|').map(str::trim).collect();
    let [title, ingredients, instructions, minutes, servings] = fields.as_slice() else {
        return Err("expected: <title> | <ingredients> | <instructions> | <minutes> | <servings>".into());
    };
    Ok(RecipeDraft {
        title: title.to_string(),
        ingredients: ingredients.to_string(),
        instructions: instructions.to_string(),
        cooking_time: minutes.parse().map_err(|_| format!("invalid minutes '{}'", minutes))?,
        servings: servings.parse().map_err(|_| format!("invalid servings '{}'", servings))?,
    })
}

/// Execute one command. Returns `Ok(false)` when the interpreter should stop.
pub async fn execute(app: &RecipeBox, cmd: Command) -> AppResult<bool> {
    let users = app.users();
    let admin = app.admin();
    match cmd {
        Command::Login { email, password } => {
            let who = users.login(&email, &password).await?;
            println!("welcome back, {}", who.name);
        }
        Command::Register { name, email, password } => {
            let who = users.register(&name, &email, &password).await?;
            println!("account created; signed in as {}", who.name);
        }
        Command::Logout => {
            users.logout();
            println!("signed out");
        }
        Command::WhoAmI => match users.session() {
            Session::Authenticated(id) => println!("{} <{}> (id {})", id.name, id.email, id.id),
            other => println!("{}", other.status()),
        },
        Command::Recipes(q) => {
            let recipes = app.search_recipes(&q).await?;
            print_table(&RECIPE_COLUMNS, &recipe_rows(&recipes));
        }
        Command::Favorites => {
            let recipes = users.favorites().list().await?;
            print_table(&RECIPE_COLUMNS, &recipe_rows(&recipes));
        }
        Command::ToggleFavorite(id) => {
            let favs = users.favorites();
            let mut current: Vec<String> = favs.list().await?.into_iter().map(|r| r.id).collect();
            match favs.toggle(&id, &mut current).await? {
                FavoriteChange::Added => println!("Recipe added to favorites!"),
                FavoriteChange::Removed => println!("Recipe removed from favorites!"),
            }
        }
        Command::AdminLogin(password) => {
            admin.login(&password).await?;
            println!("admin signed in");
        }
        Command::AdminSetup { username, password, confirm } => {
            admin.setup(&username, &password, &confirm).await?;
            println!("Admin account created successfully!");
        }
        Command::AdminLogout => {
            admin.logout();
            println!("admin signed out");
        }
        Command::AdminStatus => println!("admin: {}", admin.session()),
        Command::AdminRecipes => {
            let recipes = admin.list_recipes().await?;
            print_table(&RECIPE_COLUMNS, &recipe_rows(&recipes));
        }
        Command::AdminAdd(draft) => {
            admin.create_recipe(&draft).await?;
            println!("Recipe added successfully!");
        }
        Command::AdminEdit { id, draft } => {
            admin.update_recipe(&id, &draft).await?;
            println!("Recipe updated successfully!");
        }
        Command::AdminDelete(id) => {
            admin.delete_recipe(&id).await?;
            println!("Recipe deleted successfully!");
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

/// Read-eval loop. Admin state is checked once when the loop starts, the way
/// an admin view checks it on mount.
pub fn run_repl(rt: &tokio::runtime::Runtime, app: &RecipeBox) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("recipebox interpreter. Type 'help' for commands.");
    if app.admin().initialize().is_authenticated() {
        println!("(admin session restored)");
    }
    loop {
        let line = match rl.readline("recipebox> ") {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() { continue; }
        let _ = rl.add_history_entry(line);
        let cmd = match parse_command(line) {
            Ok(c) => c,
            Err(msg) => { eprintln!("{}", msg); continue; }
        };
        match rt.block_on(execute(app, cmd)) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("error: {}", e.message()),
        }
    }
    Ok(())
}
