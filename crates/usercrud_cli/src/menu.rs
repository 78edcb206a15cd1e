//! Six-choice menu loop.
//!
//! # Invariants
//! - A failed action (validation or storage) is reported and the loop goes on.
//! - Only I/O failures on the console itself end the loop with an error.
//! - End of input ends the loop like `Exit`.

use crate::console::Console;
use log::{debug, error, info};
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};
use usercrud_core::{User, UserRepository, UserService, UserServiceError};

pub const MENU_TITLE: &str = "=== User service ===";
pub const NO_SUCH_OPTION: &str = "No such option.";

const MENU_ITEMS: &str = "1) Create user
2) List users
3) Find user by id
4) Update user
5) Delete user
6) Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Create,
    List,
    Find,
    Update,
    Delete,
    Exit,
}

impl Choice {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "1" => Some(Self::Create),
            "2" => Some(Self::List),
            "3" => Some(Self::Find),
            "4" => Some(Self::Update),
            "5" => Some(Self::Delete),
            "6" => Some(Self::Exit),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::List => "list",
            Self::Find => "find",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Exit => "exit",
        }
    }
}

enum ActionError {
    Io(io::Error),
    Service(UserServiceError),
}

impl From<io::Error> for ActionError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<UserServiceError> for ActionError {
    fn from(value: UserServiceError) -> Self {
        Self::Service(value)
    }
}

type ActionResult = Result<(), ActionError>;

/// Runs the menu until `Exit` or end of input.
pub fn run<R, I, O>(service: &UserService<R>, console: &mut Console<I, O>) -> io::Result<()>
where
    R: UserRepository,
    I: BufRead,
    O: Write,
{
    loop {
        console.say("")?;
        console.say(MENU_TITLE)?;
        console.say(MENU_ITEMS)?;

        let line = match console.read_line("Choose an option: ") {
            Ok(line) => line,
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                info!("event=menu_exit module=cli status=ok reason=eof");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let Some(choice) = Choice::parse(&line) else {
            console.say(NO_SUCH_OPTION)?;
            continue;
        };
        if choice == Choice::Exit {
            info!("event=menu_exit module=cli status=ok reason=user");
            console.say("Bye.")?;
            return Ok(());
        }

        let outcome = match choice {
            Choice::Create => create(service, console),
            Choice::List => list(service, console),
            Choice::Find => find(service, console),
            Choice::Update => update(service, console),
            Choice::Delete => delete(service, console),
            Choice::Exit => Ok(()),
        };

        match outcome {
            Ok(()) => {}
            Err(ActionError::Service(UserServiceError::Validation(err))) => {
                debug!(
                    "event=menu_action module=cli status=rejected action={}",
                    choice.as_str()
                );
                console.say(format!("Validation error: {err}"))?;
            }
            Err(ActionError::Service(UserServiceError::Storage(err))) => {
                error!(
                    "event=menu_action module=cli status=error action={} op={} error_class={}",
                    choice.as_str(),
                    err.op().as_str(),
                    err.class().as_str()
                );
                console.say(format!("Storage error: {err}"))?;
            }
            Err(ActionError::Io(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                info!("event=menu_exit module=cli status=ok reason=eof");
                return Ok(());
            }
            Err(ActionError::Io(err)) => return Err(err),
        }
    }
}

fn create<R: UserRepository, I: BufRead, O: Write>(
    service: &UserService<R>,
    console: &mut Console<I, O>,
) -> ActionResult {
    let name = console.read_non_empty("Name: ")?;
    let email = console.read_email("Email: ")?;
    let age = console.read_optional_age("Age (empty to skip): ")?;

    let id = service.create_user(&User::new(name, Some(email), age))?;
    console.say(format!("Created user with id {id}."))?;
    Ok(())
}

fn list<R: UserRepository, I: BufRead, O: Write>(
    service: &UserService<R>,
    console: &mut Console<I, O>,
) -> ActionResult {
    let users = service.get_all_users()?;
    if users.is_empty() {
        console.say("No users yet.")?;
    }
    for user in &users {
        console.say(UserLine(user))?;
    }
    Ok(())
}

fn find<R: UserRepository, I: BufRead, O: Write>(
    service: &UserService<R>,
    console: &mut Console<I, O>,
) -> ActionResult {
    let id = console.read_id("User id: ")?;
    match service.get_user_by_id(id)? {
        Some(user) => console.say(UserLine(&user))?,
        None => console.say(format!("User {id} not found."))?,
    }
    Ok(())
}

fn update<R: UserRepository, I: BufRead, O: Write>(
    service: &UserService<R>,
    console: &mut Console<I, O>,
) -> ActionResult {
    let id = console.read_id("User id: ")?;
    let Some(mut user) = service.get_user_by_id(id)? else {
        console.say(format!("User {id} not found."))?;
        return Ok(());
    };

    console.say(format!("Current: {}", UserLine(&user)))?;
    console.say("Press Enter to keep a value unchanged.")?;
    if let Some(name) = console.read_optional(&format!("Name [{}]: ", user.name))? {
        user.name = name;
    }
    let email_prompt = format!("Email [{}]: ", user.email.as_deref().unwrap_or("-"));
    if let Some(email) = console.read_optional_email(&email_prompt)? {
        user.email = Some(email);
    }
    let age_prompt = format!("Age [{}]: ", OrDash(user.age));
    if let Some(age) = console.read_optional_age(&age_prompt)? {
        user.age = Some(age);
    }

    if service.update_user(&user)? {
        console.say(format!("Updated user {id}."))?;
    } else {
        console.say(format!("User {id} not found."))?;
    }
    Ok(())
}

fn delete<R: UserRepository, I: BufRead, O: Write>(
    service: &UserService<R>,
    console: &mut Console<I, O>,
) -> ActionResult {
    let id = console.read_id("User id: ")?;
    if service.delete_user(id)? {
        console.say(format!("Deleted user {id}."))?;
    } else {
        console.say(format!("User {id} not found."))?;
    }
    Ok(())
}

struct UserLine<'a>(&'a User);

impl Display for UserLine<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let user = self.0;
        write!(
            f,
            "#{} {} | email: {} | age: {} | created_at_ms: {}",
            OrDash(user.id),
            user.name,
            user.email.as_deref().unwrap_or("-"),
            OrDash(user.age),
            user.created_at
        )
    }
}

struct OrDash<T>(Option<T>);

impl<T: Display> Display for OrDash<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "-"),
        }
    }
}
