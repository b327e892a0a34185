//! Server-rendered HTML shells.
//!
//! The pages are thin: they carry a small amount of inline JavaScript that
//! talks to the JSON API. Styling is deliberately minimal.

use axum::response::{Html, Redirect};

/// `GET /` redirects to the admin login.
pub async fn index() -> Redirect {
    Redirect::permanent("/admin")
}

/// `GET /admin` admin login page.
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// `GET /admin/dashboard` admin dashboard shell.
pub async fn dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}

/// `GET /guest` (and `GET /guest/{number}`) guest check-in page shell.
///
/// The reservation number arrives as the `reservation` query parameter or
/// the trailing path segment and is read client-side.
pub async fn guest_page() -> Html<&'static str> {
    Html(GUEST_PAGE)
}

const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Admin Login</title>
<style>
body{font-family:sans-serif;max-width:24rem;margin:4rem auto;padding:0 1rem}
label{display:block;margin-top:1rem}
input{width:100%;padding:0.5rem;margin-top:0.25rem}
button{margin-top:1.5rem;padding:0.6rem 1.5rem}
.error{color:#b91c1c;margin-top:1rem}
</style>
</head>
<body>
<h1>Admin Login</h1>
<form id="login-form">
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Log in</button>
  <p class="error" id="error" hidden></p>
</form>
<script>
document.getElementById('login-form').addEventListener('submit', async (e) => {
  e.preventDefault();
  const data = Object.fromEntries(new FormData(e.target));
  const resp = await fetch('/admin/login', {
    method: 'POST',
    headers: {'Content-Type': 'application/json'},
    body: JSON.stringify(data),
  });
  if (resp.ok) {
    window.location = '/admin/dashboard';
  } else {
    const err = await resp.json();
    const el = document.getElementById('error');
    el.textContent = err.message;
    el.hidden = false;
  }
});
</script>
</body>
</html>
"#;

const DASHBOARD_PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Reservations</title>
<style>
body{font-family:sans-serif;max-width:64rem;margin:2rem auto;padding:0 1rem}
table{width:100%;border-collapse:collapse;margin-top:1rem}
td,th{border:1px solid #ccc;padding:0.4rem;text-align:left}
.toolbar{display:flex;gap:0.5rem;margin-top:1rem}
</style>
</head>
<body>
<h1>Reservations</h1>
<div class="toolbar">
  <a href="/api/reservations/export-csv">Export CSV</a>
  <a href="#" id="logout">Log out</a>
</div>
<table id="reservations">
  <thead>
    <tr><th>Number</th><th>Room</th><th>Check-in</th><th>Checkout</th>
    <th>Guest</th><th>Submitted</th><th>Invoice</th></tr>
  </thead>
  <tbody></tbody>
</table>
<script>
async function load() {
  const resp = await fetch('/api/reservations');
  if (resp.status === 401) { window.location = '/admin'; return; }
  const reservations = await resp.json();
  const tbody = document.querySelector('#reservations tbody');
  tbody.innerHTML = '';
  for (const r of reservations) {
    const tr = document.createElement('tr');
    for (const value of [
      r.reservation_number, r.room_number, r.checkin_date, r.checkout_date,
      [r.first_name, r.last_name].filter(Boolean).join(' ') || r.company_name || '',
      r.guest_submitted_at ? 'yes' : 'no',
      r.invoice_number || '',
    ]) {
      const td = document.createElement('td');
      td.textContent = value;
      tr.appendChild(td);
    }
    tbody.appendChild(tr);
  }
}
document.getElementById('logout').addEventListener('click', async (e) => {
  e.preventDefault();
  await fetch('/admin/logout', {method: 'POST'});
  window.location = '/admin';
});
load();
</script>
</body>
</html>
"##;

const GUEST_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Complete your check-in</title>
<style>
body{font-family:sans-serif;max-width:32rem;margin:2rem auto;padding:0 1rem}
label{display:block;margin-top:0.75rem}
input,textarea,select{width:100%;padding:0.5rem;margin-top:0.25rem}
button{margin-top:1.5rem;padding:0.6rem 1.5rem}
.codes{background:#f3f4f6;padding:1rem;border-radius:4px;margin-top:1rem}
.error{color:#b91c1c;margin-top:1rem}
.hidden{display:none}
</style>
</head>
<body>
<h1>Complete your check-in</h1>
<div id="stay"></div>
<div class="codes" id="codes" hidden></div>
<form id="guest-form" hidden>
  <label>Billing type
    <select name="invoice_type" id="invoice-type">
      <option value="individual">Individual</option>
      <option value="business">Business</option>
    </select>
  </label>
  <div id="individual-fields">
    <label>First name <input name="first_name"></label>
    <label>Last name <input name="last_name"></label>
  </div>
  <div id="business-fields" class="hidden">
    <label>Company name <input name="company_name"></label>
    <label>Tax ID <input name="tax_id"></label>
    <label>VAT EU (optional) <input name="vat_eu"></label>
  </div>
  <label>Address <input name="address"></label>
  <label>Email <input name="email" type="email"></label>
  <label>Special requests <textarea name="special_requests"></textarea></label>
  <button type="submit">Submit</button>
  <p class="error" id="error" hidden></p>
</form>
<script>
const segment = window.location.pathname.split('/').filter(Boolean).pop();
const number = new URLSearchParams(window.location.search).get('reservation')
  || (segment !== 'guest' ? decodeURIComponent(segment) : null);

function showType() {
  const business = document.getElementById('invoice-type').value === 'business';
  document.getElementById('individual-fields').classList.toggle('hidden', business);
  document.getElementById('business-fields').classList.toggle('hidden', !business);
}
document.getElementById('invoice-type').addEventListener('change', showType);

function render(view) {
  document.getElementById('stay').innerHTML =
    `<p>Reservation <strong>${view.reservation_number}</strong>, room ${view.room_number},
     ${view.checkin_date} to ${view.checkout_date} (checkout by 11:00).</p>`;
  if (view.submitted) {
    const codes = document.getElementById('codes');
    codes.hidden = false;
    codes.innerHTML = `<p>Apartment code: <strong>${view.apartment_code}</strong></p>` +
      view.building_codes.map(c => `<p>${c.name}: <strong>${c.code}</strong></p>`).join('');
  }
  const form = document.getElementById('guest-form');
  form.hidden = !view.can_edit;
  if (view.details) {
    for (const [key, value] of Object.entries(view.details)) {
      const input = form.elements[key];
      if (input && value) input.value = value;
    }
    showType();
  }
}

async function load() {
  if (!number) {
    document.getElementById('stay').textContent = 'Missing reservation number.';
    return;
  }
  const resp = await fetch(`/api/guest/${encodeURIComponent(number)}`);
  if (!resp.ok) {
    document.getElementById('stay').textContent = 'Reservation not found.';
    return;
  }
  render(await resp.json());
}

document.getElementById('guest-form').addEventListener('submit', async (e) => {
  e.preventDefault();
  const body = new URLSearchParams(new FormData(e.target));
  body.set('reservation_number', number);
  const resp = await fetch('/guest/submit', {
    method: 'POST',
    headers: {'Content-Type': 'application/x-www-form-urlencoded'},
    body,
  });
  if (resp.ok) {
    render(await resp.json());
  } else {
    const err = await resp.json();
    const el = document.getElementById('error');
    el.textContent = err.message;
    el.hidden = false;
  }
});

load();
</script>
</body>
</html>
"#;
